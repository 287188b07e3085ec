//! Machine-level tests: boot, bank switching, and CIA interrupt wiring,
//! using synthetic ROM images.

use emu_core::AddressBus;
use emu_c64::{C64, C64Config, C64Model};
use mos_6502::flags;

/// Build a config with recognisable ROM fill bytes and vectors pointing
/// into RAM: reset → $0810, IRQ/BRK → $0900, NMI → $0950.
fn test_config() -> C64Config {
    let mut kernal = vec![0xEE; 8192];
    kernal[0x1FFA] = 0x50; // NMI vector low
    kernal[0x1FFB] = 0x09;
    kernal[0x1FFC] = 0x10; // reset vector low
    kernal[0x1FFD] = 0x08;
    kernal[0x1FFE] = 0x00; // IRQ vector low
    kernal[0x1FFF] = 0x09;

    C64Config {
        model: C64Model::C64Pal,
        kernal_rom: kernal,
        basic_rom: vec![0xBB; 8192],
        char_rom: vec![0xCC; 4096],
    }
}

fn load(c64: &mut C64, addr: u16, program: &[u8]) {
    for (i, &byte) in program.iter().enumerate() {
        c64.bus_mut().ram_write(addr + i as u16, byte);
    }
}

#[test]
fn boots_from_the_kernal_reset_vector() {
    let c64 = C64::new(&test_config());
    assert_eq!(c64.cpu().regs.pc, 0x0810);
    assert_eq!(c64.cpu().regs.s, 0xFF);
}

#[test]
fn default_banking_maps_roms_and_io() {
    let mut c64 = C64::new(&test_config());
    let bus = c64.bus_mut();

    // Port $01 = $37 with DDR $2F out of reset: LORAM=HIRAM=CHAREN=1
    assert_eq!(bus.read(0x0001) & 0x07, 0x07);
    assert_eq!(bus.read(0xA000), 0xBB, "BASIC ROM, not RAM");
    assert_eq!(bus.read(0xE000), 0xEE, "Kernal ROM");
    assert_eq!(bus.read(0xD3FF), 0xFF, "unpopulated I/O reads open bus");
}

#[test]
fn bank_switch_scenario() {
    let mut c64 = C64::new(&test_config());
    let bus = c64.bus_mut();

    // All-RAM first, then back to $37 with all port bits driven
    bus.write(0x0000, 0xFF);
    bus.write(0x0001, 0x00);
    bus.ram_write(0xA000, 0x11);
    assert_eq!(bus.read(0xA000), 0x11, "all-RAM banking");

    bus.write(0x0001, 0x37);
    assert_eq!(bus.read(0xA000), 0xBB, "BASIC ROM mapped again");
    assert_eq!(bus.read(0xE000), 0xEE, "Kernal ROM mapped");
    // I/O mapped: CIA1 DDR A readable through $DC02
    bus.write(0xDC02, 0xA5);
    assert_eq!(bus.read(0xDC02), 0xA5);
}

#[test]
fn cia1_timer_fires_irq_end_to_end() {
    let mut c64 = C64::new(&test_config());

    // Main program at $0810: enable CIA1 timer A interrupt, run the
    // timer one-shot with latch 10, then spin.
    load(
        &mut c64,
        0x0810,
        &[
            0xA9, 0x81, // LDA #$81
            0x8D, 0x0D, 0xDC, // STA $DC0D  (ICR: set timer A enable)
            0xA9, 0x0A, // LDA #$0A
            0x8D, 0x04, 0xDC, // STA $DC04  (latch low = 10)
            0xA9, 0x00, // LDA #$00
            0x8D, 0x05, 0xDC, // STA $DC05  (latch high = 0)
            0xA9, 0x19, // LDA #$19
            0x8D, 0x0E, 0xDC, // STA $DC0E  (CRA: load + one-shot + start)
            0x4C, 0x24, 0x08, // spin: JMP $0824 (self)
        ],
    );

    // IRQ handler at $0900: count the interrupt, acknowledge, return.
    load(
        &mut c64,
        0x0900,
        &[
            0xEE, 0x00, 0x04, // INC $0400
            0xAD, 0x0D, 0xDC, // LDA $DC0D (acknowledge)
            0x40, // RTI
        ],
    );

    c64.run_for(300);

    assert_eq!(
        c64.bus_mut().ram_read(0x0400),
        1,
        "one-shot timer raises exactly one IRQ"
    );
    let pc = c64.cpu().regs.pc;
    assert!(
        (0x0824..=0x0827).contains(&pc),
        "returned to the spin loop, PC={pc:#06X}"
    );
    assert!(
        !c64.cpu().regs.p.is_set(flags::I),
        "RTI restored the pre-interrupt I flag"
    );
}

#[test]
fn cia2_timer_fires_nmi_even_with_irqs_disabled() {
    let mut c64 = C64::new(&test_config());

    load(
        &mut c64,
        0x0810,
        &[
            0x78, // SEI
            0xA9, 0x81, // LDA #$81
            0x8D, 0x0D, 0xDD, // STA $DD0D  (CIA2 ICR enable timer A)
            0xA9, 0x05, // LDA #$05
            0x8D, 0x04, 0xDD, // STA $DD04
            0xA9, 0x00, // LDA #$00
            0x8D, 0x05, 0xDD, // STA $DD05
            0xA9, 0x19, // LDA #$19
            0x8D, 0x0E, 0xDD, // STA $DD0E
            0x4C, 0x25, 0x08, // spin: JMP $0825 (self)
        ],
    );
    // NMI handler at $0950
    load(&mut c64, 0x0950, &[0xEE, 0x01, 0x04, 0x40]); // INC $0401; RTI

    c64.run_for(300);

    assert_eq!(
        c64.bus_mut().ram_read(0x0401),
        1,
        "CIA2 underflow reaches the NMI vector despite SEI"
    );
}

#[test]
fn vic_bank_follows_cia2_port_a() {
    let mut c64 = C64::new(&test_config());
    assert_eq!(c64.vic_bank(), 0, "default bank 0");

    c64.bus_mut().write(0xDD00, 0x01); // %01 inverted → bank 2
    assert_eq!(c64.vic_bank(), 2);
}

#[test]
fn disassembly_preview_does_not_disturb_execution() {
    let mut c64 = C64::new(&test_config());
    load(&mut c64, 0x0810, &[0xA9, 0x42]); // LDA #$42

    let text = c64.disassemble();
    assert_eq!(text, "$0810  A9 42     LDA #$42");
    assert_eq!(c64.cpu().regs.pc, 0x0810);

    c64.step();
    assert_eq!(c64.cpu().regs.a, 0x42);
}
