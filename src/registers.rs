// src/registers.rs
//
// MFRC522 register addresses, already shifted into the SPI address byte
// position (bits 6..1). Read access sets bit 7.

// Command and status registers
pub const COMMAND_REG: u8 = 0x01 << 1;
pub const COM_IRQ_REG: u8 = 0x04 << 1;         // Interrupt request bits
pub const DIV_IRQ_REG: u8 = 0x05 << 1;         // CRC and MfinAct interrupt bits
pub const ERROR_REG: u8 = 0x06 << 1;           // Error bits of the last command
pub const STATUS2_REG: u8 = 0x08 << 1;         // Receiver, transmitter and Crypto1 status
pub const FIFO_DATA_REG: u8 = 0x09 << 1;       // FIFO data input/output
pub const FIFO_LEVEL_REG: u8 = 0x0A << 1;      // Number of bytes in the FIFO buffer
pub const CONTROL_REG: u8 = 0x0C << 1;         // RxLastBits lives in bits 2..0
pub const BIT_FRAMING_REG: u8 = 0x0D << 1;     // Adjustments for bit-oriented frames
pub const COLL_REG: u8 = 0x0E << 1;            // Collision detection

// Communication configuration
pub const MODE_REG: u8 = 0x11 << 1;            // General transmit and receive modes
pub const TX_MODE_REG: u8 = 0x12 << 1;         // Transmission data rate and framing
pub const RX_MODE_REG: u8 = 0x13 << 1;         // Reception data rate and framing
pub const TX_CONTROL_REG: u8 = 0x14 << 1;      // Antenna driver pins TX1 and TX2
pub const TX_ASK_REG: u8 = 0x15 << 1;          // Transmission modulation

// CRC, timer and RF configuration
pub const CRC_RESULT_REG_H: u8 = 0x21 << 1;    // CRC calculation result, MSB
pub const CRC_RESULT_REG_L: u8 = 0x22 << 1;    // CRC calculation result, LSB
pub const MOD_WIDTH_REG: u8 = 0x24 << 1;       // Modulation width
pub const RF_CFG_REG: u8 = 0x26 << 1;          // Receiver gain
pub const T_MODE_REG: u8 = 0x2A << 1;          // Timer settings
pub const T_PRESCALER_REG: u8 = 0x2B << 1;     // Timer prescaler value
pub const T_RELOAD_REG_H: u8 = 0x2C << 1;      // 16-bit timer reload value (high byte)
pub const T_RELOAD_REG_L: u8 = 0x2D << 1;      // 16-bit timer reload value (low byte)
pub const VERSION_REG: u8 = 0x37 << 1;         // Chip software version

// Bit masks
pub const IRQ_TIMER: u8 = 0x01;                // ComIrqReg TimerIRq
pub const IRQ_IDLE: u8 = 0x10;                 // ComIrqReg IdleIRq
pub const IRQ_RX: u8 = 0x20;                   // ComIrqReg RxIRq
pub const IRQ_ALL: u8 = 0x7F;
pub const DIV_IRQ_CRC: u8 = 0x04;              // DivIrqReg CRCIRq
pub const FIFO_FLUSH: u8 = 0x80;               // FIFOLevelReg FlushBuffer
pub const START_SEND: u8 = 0x80;               // BitFramingReg StartSend
pub const ERR_COLL: u8 = 0x08;                 // ErrorReg CollErr
pub const ERR_FATAL: u8 = 0x13;                // BufferOvfl | ParityErr | ProtocolErr
pub const ERR_BUFFER_OVFL: u8 = 0x10;
pub const COLL_VALUES_AFTER_COLL: u8 = 0x80;   // CollReg ValuesAfterColl
pub const STATUS2_CRYPTO1_ON: u8 = 0x08;       // Status2Reg MFCrypto1On
pub const RX_GAIN_48DB: u8 = 0x70;             // RFCfgReg RxGain, maximum

pub const fn write_address(reg: u8) -> u8 {
    reg & 0x7E
}

pub const fn read_address(reg: u8) -> u8 {
    0x80 | (reg & 0x7E)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_bytes_follow_spi_layout() {
        assert_eq!(write_address(COMMAND_REG), 0x02);
        assert_eq!(read_address(COMMAND_REG), 0x82);
        assert_eq!(read_address(VERSION_REG), 0xEE);
        assert_eq!(write_address(FIFO_DATA_REG), 0x12);
    }
}
