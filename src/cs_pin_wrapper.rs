// src/cs_pin_wrapper.rs

use embedded_hal::digital::OutputPin;

use crate::errors::RFIDError;

/// Active-low chip select for the MFRC522, with pin errors folded into
/// [`RFIDError::CommunicationError`].
pub struct CsPinWrapper<CS> {
    cs: CS,
}

impl<CS> CsPinWrapper<CS>
where
    CS: OutputPin,
{
    pub fn new(mut cs: CS) -> Self {
        // Deselected until the first transfer
        cs.set_high().ok();
        CsPinWrapper { cs }
    }

    pub fn select(&mut self) -> Result<(), RFIDError> {
        self.cs.set_low().map_err(|_| RFIDError::CommunicationError)
    }

    pub fn deselect(&mut self) -> Result<(), RFIDError> {
        self.cs.set_high().map_err(|_| RFIDError::CommunicationError)
    }
}
