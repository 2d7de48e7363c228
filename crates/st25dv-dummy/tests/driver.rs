//! Driver behaviour against the emulated tag

use st25dv_core::bus::{SYSTEM_ADDRESS, USER_ADDRESS};
use st25dv_core::codec;
use st25dv_core::regs::{
    self, AreaProtection, EhMode, GpoConfig, InterruptStatus, Register, RfManagement,
    RfPasswordControl,
};
use st25dv_core::{CapacityVariant, DriverConfig, Error, St25dv};
use st25dv_dummy::{DummyConfig, DummyTag, TransactionKind};

const PASSWORD: u64 = 0x1122_3344_5566_7788;

fn open_tag(config: DummyConfig, driver: DriverConfig) -> St25dv<DummyTag> {
    let mut tag = St25dv::new(DummyTag::new(config), driver).unwrap();
    tag.bus_mut().clear_transactions();
    tag
}

fn default_tag() -> St25dv<DummyTag> {
    open_tag(DummyConfig::default(), DriverConfig::default())
}

fn unlocked_tag() -> St25dv<DummyTag> {
    let mut tag = open_tag(
        DummyConfig::default().with_password(PASSWORD),
        DriverConfig::default(),
    );
    assert!(tag.present_password(PASSWORD).unwrap());
    tag.bus_mut().clear_transactions();
    tag
}

// =============================================================================
// Capacity and user memory
// =============================================================================

#[test]
fn test_capacity_detection() {
    let cases = [
        (CapacityVariant::K04, 0x0200),
        (CapacityVariant::K16, 0x0800),
        (CapacityVariant::K64, 0x2000),
    ];
    for (variant, end) in cases {
        let tag = open_tag(DummyConfig::new(variant), DriverConfig::default());
        assert_eq!(tag.capacity(), variant);
        assert_eq!(tag.user_memory_end(), end);
    }
}

#[test]
fn test_unknown_capacity_code_falls_back_to_04k() {
    let mut bus = DummyTag::new(DummyConfig::new(CapacityVariant::K64));
    bus.system_area_mut()[regs::MEM_SIZE_H.offset as usize] = 0x42;
    let tag = St25dv::new(bus, DriverConfig::default()).unwrap();
    assert_eq!(tag.capacity(), CapacityVariant::K04);
    assert_eq!(tag.user_memory_end(), 0x0200);
}

#[test]
fn test_detection_reads_capacity_code_once() {
    let tag = St25dv::new(DummyTag::new_default(), DriverConfig::default()).unwrap();
    let txns = tag.bus().transactions();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].kind, TransactionKind::Read);
    assert_eq!(txns[0].device, SYSTEM_ADDRESS);
    assert_eq!(txns[0].offset, regs::MEM_SIZE_H.offset);
}

#[test]
fn test_user_memory_boundary() {
    let mut tag = default_tag();

    tag.write_byte(0x01FF, 0x5A).unwrap();
    assert_eq!(tag.read_byte(0x01FF).unwrap(), 0x5A);
    assert_eq!(tag.bus().user_memory()[0x01FF], 0x5A);

    tag.bus_mut().clear_transactions();
    tag.write_byte(0x0200, 0xA5).unwrap();
    assert_eq!(tag.read_byte(0x0200).unwrap(), 0);
    assert_eq!(tag.read_byte(0xFFFF).unwrap(), 0);
    assert!(tag.bus().transactions().is_empty());
}

#[test]
fn test_checked_variants_report_clamp() {
    let mut tag = default_tag();
    assert!(tag.write_byte_checked(0x0010, 7).unwrap());
    assert_eq!(tag.read_byte_checked(0x0010).unwrap(), Some(7));

    tag.bus_mut().clear_transactions();
    assert!(!tag.write_byte_checked(0x0200, 7).unwrap());
    assert_eq!(tag.read_byte_checked(0x0200).unwrap(), None);
    assert!(tag.bus().transactions().is_empty());
}

#[test]
fn test_bulk_access_stops_at_boundary() {
    let mut tag = default_tag();

    let written = tag.write_user(0x01FE, &[1, 2, 3, 4]).unwrap();
    assert_eq!(written, 2);
    let txns = tag.bus().transactions();
    assert_eq!(txns.len(), 2);
    assert!(txns.iter().all(|t| t.kind == TransactionKind::Write && t.data.len() == 1));

    let mut buf = [0xEEu8; 4];
    let read = tag.read_user(0x01FE, &mut buf).unwrap();
    assert_eq!(read, 2);
    assert_eq!(buf, [1, 2, 0xEE, 0xEE]);
}

#[test]
fn test_user_memory_in_64k_variant() {
    let mut tag = open_tag(DummyConfig::new(CapacityVariant::K64), DriverConfig::default());
    tag.write_byte(0x1FFF, 0x42).unwrap();
    assert_eq!(tag.read_byte(0x1FFF).unwrap(), 0x42);
    assert_eq!(tag.read_byte_checked(0x2000).unwrap(), None);
}

// =============================================================================
// Scalar codec
// =============================================================================

#[test]
fn test_scalar_round_trips_are_big_endian() {
    let mut bus = DummyTag::new_default();

    codec::set_word16(&mut bus, Register::user(0x10), 0xBEEF).unwrap();
    assert_eq!(codec::get_word16(&mut bus, Register::user(0x10)).unwrap(), 0xBEEF);
    assert_eq!(&bus.user_memory()[0x10..0x12], &[0xBE, 0xEF]);

    let value = 0x0102_0304_0506_0708;
    codec::set_word64(&mut bus, Register::user(0x20), value).unwrap();
    assert_eq!(codec::get_word64(&mut bus, Register::user(0x20)).unwrap(), value);
    assert_eq!(&bus.user_memory()[0x20..0x28], &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_bit_round_trip_leaves_other_bits() {
    let mut bus = DummyTag::new_default();
    let reg = Register::user(0x30);

    for bit in 0..8u8 {
        bus.user_memory_mut()[0x30] = 0b1010_0101;
        codec::set_bit(&mut bus, reg, bit, true).unwrap();
        assert!(codec::get_bit(&mut bus, reg, bit).unwrap());
        assert_eq!(bus.user_memory()[0x30], 0b1010_0101 | (1 << bit));

        codec::set_bit(&mut bus, reg, bit, false).unwrap();
        assert!(!codec::get_bit(&mut bus, reg, bit).unwrap());
        assert_eq!(bus.user_memory()[0x30], 0b1010_0101 & !(1 << bit));
    }
}

// =============================================================================
// Area-indexed configuration
// =============================================================================

#[test]
fn test_invalid_area_issues_no_transaction() {
    let mut tag = unlocked_tag();

    assert_eq!(tag.area_end(0).unwrap(), 0);
    assert_eq!(tag.area_end(4).unwrap(), 0);
    tag.set_area_end(0, 5).unwrap();
    tag.set_area_end(4, 5).unwrap();
    assert_eq!(tag.rf_password_control(0).unwrap(), RfPasswordControl::None);
    assert_eq!(tag.rf_protection(5).unwrap(), AreaProtection::Open);
    assert_eq!(tag.i2c_protection(5).unwrap(), AreaProtection::Open);
    tag.set_i2c_protection(0, AreaProtection::WriteProtected).unwrap();

    assert!(tag.bus().transactions().is_empty());
}

#[test]
fn test_valid_area_reads_once_each() {
    let mut tag = default_tag();
    for area in 1..=3 {
        assert_eq!(tag.area_end(area).unwrap(), 0x0F);
    }
    let txns = tag.bus().transactions();
    assert_eq!(txns.len(), 3);
    let offsets: Vec<u16> = txns.iter().map(|t| t.offset).collect();
    assert_eq!(offsets, [0x0005, 0x0007, 0x0009]);
}

#[test]
fn test_i2c_protection_update_is_isolated() {
    let mut tag = unlocked_tag();
    let i2css = regs::I2CSS.offset as usize;
    tag.bus_mut().system_area_mut()[i2css] = 0b1100_1100;

    tag.set_i2c_protection(2, AreaProtection::WriteProtected).unwrap();
    assert_eq!(tag.bus().system_area()[i2css], 0b1100_0100);

    assert_eq!(tag.i2c_protection(1).unwrap(), AreaProtection::Open);
    assert_eq!(tag.i2c_protection(2).unwrap(), AreaProtection::WriteProtected);
    assert_eq!(tag.i2c_protection(3).unwrap(), AreaProtection::Open);
    assert_eq!(
        tag.i2c_protection(4).unwrap(),
        AreaProtection::ReadProtectedWriteForbidden
    );
}

#[test]
fn test_rf_area_security_fields_share_a_byte() {
    let mut tag = unlocked_tag();

    tag.set_rf_password_control(3, RfPasswordControl::Password2).unwrap();
    tag.set_rf_protection(3, AreaProtection::ReadWriteProtected).unwrap();
    assert_eq!(tag.bus().system_area()[regs::RFA3SS.offset as usize], 0b1010);

    tag.set_rf_password_control(3, RfPasswordControl::Password1).unwrap();
    assert_eq!(tag.rf_password_control(3).unwrap(), RfPasswordControl::Password1);
    assert_eq!(tag.rf_protection(3).unwrap(), AreaProtection::ReadWriteProtected);
}

#[test]
fn test_area_end_round_trip() {
    let mut tag = unlocked_tag();
    tag.set_area_end(1, 0x03).unwrap();
    tag.set_area_end(2, 0x07).unwrap();
    assert_eq!(tag.area_end(1).unwrap(), 0x03);
    assert_eq!(tag.area_end(2).unwrap(), 0x07);
    assert_eq!(tag.area_end(3).unwrap(), 0x0F);
}

#[test]
fn test_i2c_write_protection_applies_to_user_memory() {
    let mut tag = unlocked_tag();
    tag.set_area_end(1, 0x00).unwrap();
    tag.set_i2c_protection(2, AreaProtection::WriteProtected).unwrap();
    tag.write_byte(0x0040, 0x11).unwrap();
    assert!(!tag.lock().unwrap());

    assert_eq!(tag.write_byte(0x0040, 0x22).unwrap_err(), Error::Nack);
    assert_eq!(tag.read_byte(0x0040).unwrap(), 0x11);
    tag.write_byte(0x0010, 0x33).unwrap();
}

// =============================================================================
// Security session
// =============================================================================

#[test]
fn test_password_flow() {
    let mut tag = open_tag(
        DummyConfig::default().with_password(PASSWORD),
        DriverConfig::default(),
    );

    assert!(!tag.present_password(0xDEAD_BEEF).unwrap());
    assert!(!tag.is_unlocked().unwrap());

    assert!(tag.present_password(PASSWORD).unwrap());
    assert!(tag.is_unlocked().unwrap());

    let writes: Vec<_> = tag
        .bus()
        .transactions()
        .iter()
        .filter(|t| t.kind == TransactionKind::Write)
        .collect();
    assert_eq!(writes.len(), 2);
    for write in writes {
        assert_eq!(write.device, SYSTEM_ADDRESS);
        assert_eq!(write.offset, 0x0900);
        assert_eq!(write.data.len(), 17);
        assert_eq!(write.data[8], 0x09);
    }
    assert_eq!(
        tag.bus().transactions()[3].data,
        [
            0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x09, 0x11, 0x22, 0x33, 0x44, 0x55,
            0x66, 0x77, 0x88
        ]
    );
}

#[test]
fn test_lock_closes_session() {
    let mut tag = unlocked_tag();
    assert!(!tag.lock().unwrap());
    assert!(!tag.is_unlocked().unwrap());
    assert_eq!(tag.bus().password(), PASSWORD);
    assert!(tag.present_password(PASSWORD).unwrap());
}

#[test]
fn test_lock_when_already_closed() {
    let mut tag = open_tag(
        DummyConfig::default().with_password(PASSWORD),
        DriverConfig::default(),
    );
    tag.bus_mut().clear_transactions();

    assert!(!tag.lock().unwrap());
    assert!(!tag.is_unlocked().unwrap());
    assert!(tag
        .bus()
        .transactions()
        .iter()
        .all(|t| t.kind == TransactionKind::Read && t.device == USER_ADDRESS));
}

#[test]
fn test_change_password() {
    let mut tag = unlocked_tag();
    let new = 0x0BAD_F00D_0BAD_F00D;

    assert!(tag.change_i2c_password(new).unwrap());
    assert_eq!(tag.bus().password(), new);
    assert_eq!(tag.i2c_password().unwrap(), new);

    tag.bus_mut().power_cycle();
    assert!(!tag.present_password(PASSWORD).unwrap());
    assert!(tag.present_password(new).unwrap());
}

#[test]
fn test_password_read_needs_session() {
    let mut tag = default_tag();
    assert_eq!(tag.i2c_password().unwrap_err(), Error::Nack);
}

#[test]
fn test_power_cycle_relocks() {
    let mut tag = unlocked_tag();
    tag.set_area_end(1, 0x01).unwrap();

    tag.bus_mut().power_cycle();
    assert!(!tag.is_unlocked().unwrap());
    assert_eq!(tag.set_area_end(1, 0x02).unwrap_err(), Error::Nack);
    assert_eq!(tag.area_end(1).unwrap(), 0x01);
}

#[test]
fn test_locked_writes_reach_the_tag_by_default() {
    let mut tag = default_tag();
    assert_eq!(tag.set_i2c_password(0x1234).unwrap_err(), Error::Nack);
    let last = tag.bus().transactions().last().unwrap();
    assert_eq!(last.kind, TransactionKind::Write);
    assert_eq!(last.offset, 0x0900);
    assert_eq!(last.data.len(), 8);
}

#[test]
fn test_strict_mode_refuses_locked_config_writes() {
    let mut tag = open_tag(
        DummyConfig::default().with_password(PASSWORD),
        DriverConfig::default().strict(),
    );

    assert_eq!(tag.set_area_end(1, 0x03).unwrap_err(), Error::UnauthorizedWrite);
    assert_eq!(tag.set_i2c_password(0).unwrap_err(), Error::UnauthorizedWrite);
    let txns = tag.bus().transactions();
    assert_eq!(txns.len(), 2);
    assert!(txns
        .iter()
        .all(|t| t.kind == TransactionKind::Read && t.offset == regs::I2C_SSO_DYN.offset));

    // User memory and dynamic registers are not gated
    tag.write_byte(0x0000, 1).unwrap();
    tag.set_rf_sleep_dyn(true).unwrap();

    assert!(tag.present_password(PASSWORD).unwrap());
    tag.set_area_end(1, 0x03).unwrap();
    assert_eq!(tag.area_end(1).unwrap(), 0x03);
}

// =============================================================================
// Timing
// =============================================================================

#[test]
fn test_builtin_settle_delays() {
    let mut tag = unlocked_tag();
    let start = tag.bus().total_delay_us();

    tag.write_byte(0x0000, 1).unwrap();
    assert_eq!(tag.bus().total_delay_us() - start, 6_000);

    tag.set_area_end(1, 0x02).unwrap();
    assert_eq!(tag.bus().total_delay_us() - start, 12_000);

    tag.set_i2c_password(PASSWORD).unwrap();
    assert_eq!(tag.bus().total_delay_us() - start, 30_000);

    // Volatile registers never wait
    tag.set_rf_sleep_dyn(true).unwrap();
    tag.set_gpo_enabled_dyn(false).unwrap();
    assert_eq!(tag.bus().total_delay_us() - start, 30_000);

    tag.present_password(PASSWORD).unwrap();
    assert_eq!(tag.bus().total_delay_us() - start, 40_000);
}

#[test]
fn test_external_timing_skips_delays_and_verification() {
    let mut tag = open_tag(
        DummyConfig::default().with_password(PASSWORD),
        DriverConfig::default().external_timing(),
    );

    assert!(tag.present_password(0xBAD).unwrap());
    assert_eq!(tag.bus().transactions().len(), 1);
    assert!(!tag.is_unlocked().unwrap());

    assert!(tag.present_password(PASSWORD).unwrap());
    tag.write_byte(0x0000, 1).unwrap();
    tag.set_area_end(1, 0x02).unwrap();
    assert_eq!(tag.bus().total_delay_us(), 0);
    assert!(!tag.lock().unwrap());
    assert!(!tag.is_unlocked().unwrap());
}

// =============================================================================
// Fault propagation
// =============================================================================

#[test]
fn test_bus_errors_propagate() {
    let mut tag = default_tag();

    tag.bus_mut().fail_next(Error::Timeout);
    assert_eq!(tag.read_byte(0x0000).unwrap_err(), Error::Timeout);

    tag.bus_mut().fail_next(Error::Nack);
    assert_eq!(tag.present_password(0).unwrap_err(), Error::Nack);

    tag.bus_mut().fail_next(Error::ArbitrationLost);
    assert_eq!(tag.interrupt_status().unwrap_err(), Error::ArbitrationLost);
    assert!(Error::ArbitrationLost.is_bus_error());
}

#[test]
fn test_failed_read_aborts_read_modify_write() {
    let mut tag = unlocked_tag();
    tag.bus_mut().fail_next(Error::BusFault);
    assert_eq!(
        tag.set_rf_protection(1, AreaProtection::WriteProtected).unwrap_err(),
        Error::BusFault
    );

    let txns = tag.bus().transactions();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].kind, TransactionKind::Read);
    assert_eq!(tag.bus().system_area()[regs::RFA1SS.offset as usize], 0);
}

// =============================================================================
// Dynamic and configuration registers
// =============================================================================

#[test]
fn test_rf_field_status() {
    let mut tag = default_tag();
    assert!(!tag.rf_field_present().unwrap());
    assert!(tag.vcc_on().unwrap());

    tag.bus_mut().set_rf_field(true);
    assert!(tag.rf_field_present().unwrap());
    let it = tag.interrupt_status().unwrap();
    assert!(it.contains(InterruptStatus::FIELD_RISING));
    assert!(tag.interrupt_status().unwrap().is_empty());

    tag.bus_mut().set_rf_field(false);
    assert_eq!(tag.interrupt_status().unwrap(), InterruptStatus::FIELD_FALLING);
}

#[test]
fn test_energy_harvesting() {
    let mut tag = default_tag();
    tag.bus_mut().set_rf_field(true);

    // Factory EH_MODE is on demand
    assert_eq!(tag.eh_mode().unwrap(), EhMode::OnDemand);
    assert!(!tag.eh_enabled().unwrap());
    assert!(!tag.eh_active().unwrap());

    tag.set_eh_enabled(true).unwrap();
    assert!(tag.eh_enabled().unwrap());
    assert!(tag.eh_active().unwrap());
    assert!(tag.energy_harvest_status().unwrap().contains(regs::EnergyHarvestStatus::FIELD_ON));
}

#[test]
fn test_eh_mode_applies_at_boot() {
    let mut tag = unlocked_tag();
    tag.set_eh_mode(EhMode::ForcedAtBoot).unwrap();
    assert!(!tag.eh_enabled().unwrap());
    tag.bus_mut().power_cycle();
    assert!(tag.eh_enabled().unwrap());
}

#[test]
fn test_gpo_dynamic_control() {
    let mut tag = default_tag();
    assert!(tag.gpo_enabled_dyn().unwrap());
    assert_eq!(tag.gpo_mode_dyn().unwrap(), GpoConfig::FIELD_CHANGE_EN);

    tag.set_gpo_mode_dyn(GpoConfig::RF_USER_EN | GpoConfig::RF_WRITE_EN).unwrap();
    assert!(tag.gpo_enabled_dyn().unwrap());
    assert_eq!(
        tag.gpo_mode_dyn().unwrap(),
        GpoConfig::RF_USER_EN | GpoConfig::RF_WRITE_EN
    );

    tag.set_gpo_enabled_dyn(false).unwrap();
    assert!(!tag.gpo_enabled_dyn().unwrap());
    assert!(tag.gpo_enabled().unwrap());
}

#[test]
fn test_rf_management() {
    let mut tag = unlocked_tag();

    tag.set_rf_sleep_dyn(true).unwrap();
    assert!(tag.rf_sleep_dyn().unwrap());
    assert!(!tag.rf_disabled_dyn().unwrap());

    tag.set_rf_disabled(true).unwrap();
    assert!(tag.rf_disabled().unwrap());
    assert!(!tag.rf_sleep().unwrap());
    assert_eq!(tag.rf_management().unwrap(), RfManagement::RF_DISABLE);

    tag.bus_mut().power_cycle();
    assert_eq!(tag.rf_management_dyn().unwrap(), RfManagement::RF_DISABLE);
}

#[test]
fn test_boot_configuration_fields() {
    let mut tag = unlocked_tag();

    tag.set_gpo_enabled(false).unwrap();
    assert_eq!(tag.gpo_config().unwrap(), GpoConfig::FIELD_CHANGE_EN);
    tag.set_gpo_config(GpoConfig::GPO_EN | GpoConfig::RF_PUT_MSG_EN).unwrap();
    assert!(tag.gpo_enabled().unwrap());

    tag.set_interrupt_pulse(5).unwrap();
    assert_eq!(tag.interrupt_pulse().unwrap(), 5);

    tag.set_mailbox_watchdog(2).unwrap();
    assert_eq!(tag.mailbox_watchdog().unwrap(), 2);

    tag.set_cc_file_lock(0b01).unwrap();
    assert_eq!(tag.cc_file_lock().unwrap(), 0b01);

    tag.set_config_locked(true).unwrap();
    assert!(tag.config_locked().unwrap());

    tag.set_mailbox_mode(true).unwrap();
    assert!(tag.mailbox_mode().unwrap());
}

#[test]
fn test_identification() {
    let mut tag = open_tag(DummyConfig::new(CapacityVariant::K16), DriverConfig::default());
    assert_eq!(tag.uid().unwrap(), 0xE002_2600_1234_5678);
    assert_eq!(tag.ic_ref().unwrap(), 0x26);
    assert_eq!(tag.revision().unwrap(), 0x11);
    assert_eq!(tag.block_size().unwrap(), 0x03);
    assert_eq!(tag.dsfid().unwrap(), 0xFF);
    assert_eq!(tag.afi().unwrap(), 0x00);
    assert_eq!(tag.dsfid_lock().unwrap(), 0);
    assert_eq!(tag.afi_lock().unwrap(), 0);

    let raw = tag.mem_blocks().unwrap();
    assert_eq!(raw.to_be_bytes(), [0xFF, 0x01]);
}

// =============================================================================
// Mailbox
// =============================================================================

fn mailbox_tag() -> St25dv<DummyTag> {
    let mut tag = unlocked_tag();
    tag.set_mailbox_mode(true).unwrap();
    tag.set_mailbox_enabled(true).unwrap();
    tag.bus_mut().clear_transactions();
    tag
}

#[test]
fn test_mailbox_needs_mode() {
    let mut tag = default_tag();
    tag.set_mailbox_enabled(true).unwrap();
    assert!(!tag.mailbox_enabled().unwrap());
    assert_eq!(tag.write_mailbox(b"hi").unwrap_err(), Error::Nack);
}

#[test]
fn test_mailbox_host_to_rf() {
    let mut tag = mailbox_tag();
    assert!(tag.mailbox_enabled().unwrap());
    assert_eq!(tag.mailbox_message_len().unwrap(), 0);

    let before = tag.bus().total_delay_us();
    tag.write_mailbox(b"hello").unwrap();
    assert_eq!(tag.bus().total_delay_us(), before);

    assert!(tag.host_put_message().unwrap());
    assert!(!tag.rf_put_message().unwrap());
    assert_eq!(tag.mailbox_message_size().unwrap(), 4);
    assert_eq!(tag.mailbox_message_len().unwrap(), 5);

    // Mailbox holds one message at a time
    assert_eq!(tag.write_mailbox(b"again").unwrap_err(), Error::Nack);

    assert_eq!(tag.bus_mut().rf_take_message().unwrap(), b"hello");
    assert_eq!(tag.mailbox_message_len().unwrap(), 0);
    assert!(tag.interrupt_status().unwrap().contains(InterruptStatus::RF_GET_MSG));
}

#[test]
fn test_mailbox_rf_to_host() {
    let mut tag = mailbox_tag();
    assert!(tag.bus_mut().rf_put_message(b"pong"));
    assert!(tag.rf_put_message().unwrap());

    let mut buf = [0u8; 16];
    assert_eq!(tag.read_mailbox(&mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], b"pong");
    assert_eq!(tag.mailbox_message_len().unwrap(), 0);
    assert_eq!(tag.read_mailbox(&mut buf).unwrap(), 0);
}

#[test]
fn test_mailbox_missed_messages() {
    let mut tag = mailbox_tag();
    assert!(!tag.host_missed_message().unwrap());
    assert!(!tag.rf_missed_message().unwrap());

    tag.write_mailbox(b"unread").unwrap();
    assert!(tag.bus_mut().expire_mailbox_watchdog());
    assert!(tag.host_missed_message().unwrap());
    assert!(!tag.rf_missed_message().unwrap());
    assert_eq!(tag.mailbox_message_len().unwrap(), 0);

    assert!(tag.bus_mut().rf_put_message(b"late"));
    assert!(tag.bus_mut().expire_mailbox_watchdog());
    assert!(tag.rf_missed_message().unwrap());
    assert!(!tag.rf_put_message().unwrap());

    let mut buf = [0u8; 8];
    assert_eq!(tag.read_mailbox(&mut buf).unwrap(), 0);
    assert!(!tag.bus_mut().expire_mailbox_watchdog());
}

#[test]
fn test_mailbox_read_truncates_to_buffer() {
    let mut tag = mailbox_tag();
    assert!(tag.bus_mut().rf_put_message(&[7u8; 200]));
    let mut buf = [0u8; 8];
    assert_eq!(tag.read_mailbox(&mut buf).unwrap(), 8);
    assert!(tag.rf_put_message().unwrap());
}

#[test]
fn test_mailbox_payload_limits() {
    let mut tag = mailbox_tag();
    assert_eq!(tag.write_mailbox(&[]).unwrap_err(), Error::InvalidParameter);
    assert_eq!(tag.write_mailbox(&[0u8; 257]).unwrap_err(), Error::PayloadTooLarge);
    assert!(tag.bus().transactions().is_empty());

    tag.write_mailbox(&[0xAAu8; 256]).unwrap();
    assert_eq!(tag.mailbox_message_len().unwrap(), 256);
    let last_write = tag
        .bus()
        .transactions()
        .iter()
        .find(|t| t.kind == TransactionKind::Write)
        .unwrap();
    assert_eq!(last_write.device, USER_ADDRESS);
    assert_eq!(last_write.offset, regs::MAILBOX_START);
}

#[test]
fn test_disabling_mailbox_discards_message() {
    let mut tag = mailbox_tag();
    tag.write_mailbox(b"stale").unwrap();
    tag.set_mailbox_enabled(false).unwrap();
    assert!(!tag.mailbox_enabled().unwrap());
    assert_eq!(tag.mailbox_message_len().unwrap(), 0);
}
