// src/commands.rs

// Commands for the MFRC522
pub const PCD_IDLE: u8 = 0x00;
pub const PCD_CALC_CRC: u8 = 0x03; // CRC calculation command
pub const PCD_TRANSCEIVE: u8 = 0x0C;
pub const PCD_MF_AUTHENT: u8 = 0x0E; // MIFARE standard authentication as a reader
pub const PCD_SOFT_RESET: u8 = 0x0F;

// Commands sent to the PICC
pub const PICC_REQA: u8 = 0x26; // 7 bit frame
pub const PICC_SEL_CL1: u8 = 0x93;
pub const PICC_SEL_CL2: u8 = 0x95;
pub const PICC_SEL_CL3: u8 = 0x97;
pub const PICC_HLTA: u8 = 0x50;
pub const PICC_CT: u8 = 0x88; // Cascade tag, marks an incomplete UID in this level

// MIFARE Classic
pub const MF_AUTH_KEY_A: u8 = 0x60;
pub const MF_AUTH_KEY_B: u8 = 0x61;
pub const MF_READ: u8 = 0x30;
pub const MF_WRITE: u8 = 0xA0;
pub const MF_ACK: u8 = 0x0A; // 4 bit ACK nibble

// Anticollision NVB: two bytes sent, no UID bits
pub const NVB_ANTICOLL: u8 = 0x20;
// Select NVB: seven bytes sent
pub const NVB_SELECT: u8 = 0x70;
