use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use ufmt::uWrite;

use crate::commands::*;
use crate::console::write_hex;
use crate::cs_pin_wrapper::CsPinWrapper;
use crate::errors::RFIDError;
use crate::registers::*;
use crate::transceiver::{Block, KeyType, MifareKey, Transceiver, Uid, BLOCK_SIZE, MAX_UID_LEN};

// Polls of ComIrqReg before giving up. The TAuto timer fires after 25 ms.
const IRQ_POLLS: u8 = 36;
const CRC_POLLS: u8 = 100;

/// MFRC522 reader on an SPI bus with a manually driven chip select.
pub struct RfidRc522<SPI, CS, D> {
    spi: SPI,
    cs: CsPinWrapper<CS>,
    delay: D,
}

impl<SPI, CS, D> RfidRc522<SPI, CS, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, cs: CS, delay: D) -> Self {
        RfidRc522 {
            spi,
            cs: CsPinWrapper::new(cs),
            delay,
        }
    }

    /// Hard reset through `reset_pin`, soft reset, then the register setup
    /// for ISO 14443A at 106 kBd with a 25 ms receive timeout.
    pub fn init<RST, W>(&mut self, reset_pin: &mut RST, serial: &mut W) -> Result<u8, RFIDError>
    where
        RST: OutputPin,
        W: uWrite,
    {
        reset_pin.set_low().ok();
        self.delay.delay_ms(50);
        reset_pin.set_high().ok();
        self.delay.delay_ms(50);

        self.write_register(COMMAND_REG, PCD_SOFT_RESET)?;
        self.delay.delay_ms(50);

        let version = self.version()?;
        serial.write_str("RFID-RC522 Version: 0x").ok();
        write_hex(serial, &[version]);
        ufmt::uwriteln!(serial, "").ok();

        self.write_register(TX_MODE_REG, 0x00)?;
        self.write_register(RX_MODE_REG, 0x00)?;
        self.write_register(MOD_WIDTH_REG, 0x26)?;
        // TAuto, f_timer = 13.56 MHz / (2 * 0xA9 + 1) ~ 40 kHz, reload 1000 -> 25 ms
        self.write_register(T_MODE_REG, 0x80)?;
        self.write_register(T_PRESCALER_REG, 0xA9)?;
        self.write_register(T_RELOAD_REG_H, 0x03)?;
        self.write_register(T_RELOAD_REG_L, 0xE8)?;
        self.write_register(TX_ASK_REG, 0x40)?; // 100% ASK
        self.write_register(MODE_REG, 0x3D)?; // CRC preset to 0x6363
        self.antenna_on()?;
        self.set_antenna_gain_max()?;

        Ok(version)
    }

    pub fn version(&mut self) -> Result<u8, RFIDError> {
        self.read_register(VERSION_REG)
    }

    /// CRC_A over `data`, computed by the coprocessor. Returned LSB first.
    pub fn calculate_crc(&mut self, data: &[u8]) -> Result<[u8; 2], RFIDError> {
        self.write_register(COMMAND_REG, PCD_IDLE)?;
        self.write_register(DIV_IRQ_REG, DIV_IRQ_CRC)?;
        self.write_register(FIFO_LEVEL_REG, FIFO_FLUSH)?;
        for &byte in data {
            self.write_register(FIFO_DATA_REG, byte)?;
        }
        self.write_register(COMMAND_REG, PCD_CALC_CRC)?;

        let mut polls = CRC_POLLS;
        loop {
            if self.read_register(DIV_IRQ_REG)? & DIV_IRQ_CRC != 0 {
                break;
            }
            polls -= 1;
            if polls == 0 {
                return Err(RFIDError::Timeout);
            }
            self.delay.delay_ms(1);
        }

        self.write_register(COMMAND_REG, PCD_IDLE)?;
        Ok([
            self.read_register(CRC_RESULT_REG_L)?,
            self.read_register(CRC_RESULT_REG_H)?,
        ])
    }

    /// Sends REQA as a 7 bit short frame and returns the ATQA.
    pub fn request_a(&mut self) -> Result<[u8; 2], RFIDError> {
        self.clear_bits(COLL_REG, COLL_VALUES_AFTER_COLL)?;
        let mut atqa = [0u8; 2];
        let mut valid_bits = 7;
        let received = self.transceive(&[PICC_REQA], &mut atqa, &mut valid_bits, false)?;
        if received != 2 || valid_bits != 0 {
            return Err(RFIDError::Error);
        }
        Ok(atqa)
    }

    /// Anticollision and select over up to three cascade levels.
    ///
    /// A collision inside a cascade level is reported as
    /// [`RFIDError::Collision`], not resolved bit by bit.
    pub fn select(&mut self) -> Result<Uid, RFIDError> {
        let mut uid = [0u8; MAX_UID_LEN];
        let mut len = 0;

        for &sel in &[PICC_SEL_CL1, PICC_SEL_CL2, PICC_SEL_CL3] {
            self.clear_bits(COLL_REG, COLL_VALUES_AFTER_COLL)?;

            let mut answer = [0u8; 5];
            let mut valid_bits = 0;
            let received = self.transceive(&[sel, NVB_ANTICOLL], &mut answer, &mut valid_bits, false)?;
            if received != answer.len() {
                return Err(RFIDError::InvalidResponse);
            }
            let bcc = answer[0] ^ answer[1] ^ answer[2] ^ answer[3];
            if bcc != answer[4] {
                return Err(RFIDError::InvalidResponse);
            }

            let mut frame = [0u8; 9];
            frame[0] = sel;
            frame[1] = NVB_SELECT;
            frame[2..7].copy_from_slice(&answer);
            let crc = self.calculate_crc(&frame[..7])?;
            frame[7..].copy_from_slice(&crc);

            let mut sak = [0u8; 3];
            let mut valid_bits = 0;
            let received = self.transceive(&frame, &mut sak, &mut valid_bits, true)?;
            if received != sak.len() {
                return Err(RFIDError::InvalidResponse);
            }

            let part = if answer[0] == PICC_CT { &answer[1..4] } else { &answer[..4] };
            if len + part.len() > MAX_UID_LEN {
                return Err(RFIDError::NoRoom);
            }
            uid[len..len + part.len()].copy_from_slice(part);
            len += part.len();

            if sak[0] & 0x04 == 0 {
                return Ok(Uid::new(&uid[..len], sak[0]));
            }
        }

        Err(RFIDError::InvalidResponse)
    }

    pub fn set_antenna_gain_max(&mut self) -> Result<(), RFIDError> {
        self.clear_bits(RF_CFG_REG, 0x70)?;
        self.set_bits(RF_CFG_REG, RX_GAIN_48DB)
    }

    fn antenna_on(&mut self) -> Result<(), RFIDError> {
        let current = self.read_register(TX_CONTROL_REG)?;
        if (current & 0x03) != 0x03 {
            self.write_register(TX_CONTROL_REG, current | 0x03)?;
        }
        Ok(())
    }

    fn transceive(
        &mut self,
        send: &[u8],
        back: &mut [u8],
        valid_bits: &mut u8,
        check_crc: bool,
    ) -> Result<usize, RFIDError> {
        self.communicate(PCD_TRANSCEIVE, IRQ_RX | IRQ_IDLE, send, back, valid_bits, check_crc)
    }

    /// Runs `command` with `send` loaded into the FIFO and copies whatever the
    /// PICC answered into `back`. `valid_bits` carries TxLastBits in and
    /// RxLastBits out.
    fn communicate(
        &mut self,
        command: u8,
        wait_irq: u8,
        send: &[u8],
        back: &mut [u8],
        valid_bits: &mut u8,
        check_crc: bool,
    ) -> Result<usize, RFIDError> {
        let bit_framing = *valid_bits & 0x07;

        self.write_register(COMMAND_REG, PCD_IDLE)?;
        self.write_register(COM_IRQ_REG, IRQ_ALL)?;
        self.write_register(FIFO_LEVEL_REG, FIFO_FLUSH)?;
        for &byte in send {
            self.write_register(FIFO_DATA_REG, byte)?;
        }
        self.write_register(BIT_FRAMING_REG, bit_framing)?;
        self.write_register(COMMAND_REG, command)?;
        if command == PCD_TRANSCEIVE {
            self.set_bits(BIT_FRAMING_REG, START_SEND)?;
        }

        self.wait_for_irq(wait_irq)?;

        let error = self.read_register(ERROR_REG)?;
        if error & ERR_BUFFER_OVFL != 0 {
            return Err(RFIDError::BufferOverflow);
        }
        if error & ERR_FATAL != 0 {
            return Err(RFIDError::Error);
        }

        let mut received = 0;
        if !back.is_empty() {
            let level = self.read_register(FIFO_LEVEL_REG)? as usize;
            if level > back.len() {
                return Err(RFIDError::NoRoom);
            }
            for slot in back[..level].iter_mut() {
                *slot = self.read_register(FIFO_DATA_REG)?;
            }
            received = level;
            *valid_bits = self.read_register(CONTROL_REG)? & 0x07;
        }

        if error & ERR_COLL != 0 {
            return Err(RFIDError::Collision);
        }

        if !back.is_empty() && check_crc {
            if received == 1 && *valid_bits == 4 {
                return Err(RFIDError::MifareNack);
            }
            if received < 2 || *valid_bits != 0 {
                return Err(RFIDError::CrcError);
            }
            let crc = self.calculate_crc(&back[..received - 2])?;
            if back[received - 2..received] != crc {
                return Err(RFIDError::CrcError);
            }
        }

        Ok(received)
    }

    fn wait_for_irq(&mut self, wait_irq: u8) -> Result<(), RFIDError> {
        for _ in 0..IRQ_POLLS {
            let irq = self.read_register(COM_IRQ_REG)?;
            if irq & wait_irq != 0 {
                return Ok(());
            }
            if irq & IRQ_TIMER != 0 {
                return Err(RFIDError::Timeout);
            }
            self.delay.delay_ms(1);
        }
        Err(RFIDError::Timeout)
    }

    /// MIFARE two step exchange: the PICC answers every frame with a 4 bit ACK.
    fn mifare_transceive(&mut self, data: &[u8]) -> Result<(), RFIDError> {
        if data.len() > BLOCK_SIZE {
            return Err(RFIDError::NoRoom);
        }
        let mut frame = [0u8; BLOCK_SIZE + 2];
        let len = data.len();
        frame[..len].copy_from_slice(data);
        let crc = self.calculate_crc(&frame[..len])?;
        frame[len..len + 2].copy_from_slice(&crc);

        let mut ack = [0u8; 1];
        let mut valid_bits = 0;
        let received = self.transceive(&frame[..len + 2], &mut ack, &mut valid_bits, false)?;
        if received != 1 || valid_bits != 4 {
            return Err(RFIDError::Error);
        }
        if ack[0] & 0x0F != MF_ACK {
            return Err(RFIDError::MifareNack);
        }
        Ok(())
    }

    fn set_bits(&mut self, reg: u8, mask: u8) -> Result<(), RFIDError> {
        let current = self.read_register(reg)?;
        self.write_register(reg, current | mask)
    }

    fn clear_bits(&mut self, reg: u8, mask: u8) -> Result<(), RFIDError> {
        let current = self.read_register(reg)?;
        self.write_register(reg, current & !mask)
    }

    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), RFIDError> {
        let buffer = [write_address(reg), value];
        let mut read_buffer = [0u8; 2];
        self.cs.select()?;
        let result = self
            .spi
            .transfer(&mut read_buffer, &buffer)
            .and_then(|_| self.spi.flush());
        self.cs.deselect()?;
        result.map_err(|_| RFIDError::CommunicationError)
    }

    pub fn read_register(&mut self, reg: u8) -> Result<u8, RFIDError> {
        let buffer = [read_address(reg), 0x00];
        let mut read_buffer = [0u8; 2];
        self.cs.select()?;
        let result = self
            .spi
            .transfer(&mut read_buffer, &buffer)
            .and_then(|_| self.spi.flush());
        self.cs.deselect()?;
        result.map_err(|_| RFIDError::CommunicationError)?;
        Ok(read_buffer[1])
    }
}

impl<SPI, CS, D> Transceiver for RfidRc522<SPI, CS, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
{
    fn is_new_card_present(&mut self) -> bool {
        // Undo any baud rate or modulation change left over from a previous PICC
        let reset = self
            .write_register(TX_MODE_REG, 0x00)
            .and_then(|_| self.write_register(RX_MODE_REG, 0x00))
            .and_then(|_| self.write_register(MOD_WIDTH_REG, 0x26));
        if reset.is_err() {
            return false;
        }
        matches!(self.request_a(), Ok(_) | Err(RFIDError::Collision))
    }

    fn read_card_serial(&mut self) -> Result<Uid, RFIDError> {
        self.select()
    }

    fn authenticate(
        &mut self,
        key_type: KeyType,
        block: u8,
        key: &MifareKey,
        uid: &Uid,
    ) -> Result<(), RFIDError> {
        let mut frame = [0u8; 12];
        frame[0] = match key_type {
            KeyType::A => MF_AUTH_KEY_A,
            KeyType::B => MF_AUTH_KEY_B,
        };
        frame[1] = block;
        frame[2..8].copy_from_slice(key.as_bytes());
        frame[8..].copy_from_slice(&uid.auth_bytes());

        let mut valid_bits = 0;
        self.communicate(PCD_MF_AUTHENT, IRQ_IDLE, &frame, &mut [], &mut valid_bits, false)?;
        if self.read_register(STATUS2_REG)? & STATUS2_CRYPTO1_ON == 0 {
            return Err(RFIDError::Error);
        }
        Ok(())
    }

    fn read_block(&mut self, block: u8) -> Result<Block, RFIDError> {
        let mut command = [MF_READ, block, 0, 0];
        let crc = self.calculate_crc(&command[..2])?;
        command[2..].copy_from_slice(&crc);

        // 16 data bytes followed by CRC_A
        let mut buffer = [0u8; BLOCK_SIZE + 2];
        let mut valid_bits = 0;
        let received = self.transceive(&command, &mut buffer, &mut valid_bits, true)?;
        if received != buffer.len() {
            return Err(RFIDError::InvalidResponse);
        }
        let mut data = [0u8; BLOCK_SIZE];
        data.copy_from_slice(&buffer[..BLOCK_SIZE]);
        Ok(data)
    }

    fn write_block(&mut self, block: u8, data: &Block) -> Result<(), RFIDError> {
        self.mifare_transceive(&[MF_WRITE, block])?;
        self.mifare_transceive(data)
    }

    fn halt_card(&mut self) -> Result<(), RFIDError> {
        let mut command = [PICC_HLTA, 0, 0, 0];
        let crc = self.calculate_crc(&command[..2])?;
        command[2..].copy_from_slice(&crc);

        // A halted PICC stays silent, so a timeout is the success case
        let mut valid_bits = 0;
        match self.transceive(&command, &mut [], &mut valid_bits, false) {
            Err(RFIDError::Timeout) => Ok(()),
            Ok(_) => Err(RFIDError::Error),
            Err(e) => Err(e),
        }
    }

    fn stop_crypto(&mut self) {
        self.clear_bits(STATUS2_REG, STATUS2_CRYPTO1_ON).ok();
    }
}
