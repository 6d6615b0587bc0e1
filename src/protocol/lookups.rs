//! Named byte values used on the bus: module identifiers and GM5 body-module
//! addresses.
//!
//! These are plain data for applications building or interpreting frames; the
//! framing layer itself treats every address as an opaque byte.

//==================================================================================MODULE_ID
/// Module identifiers found in the source and destination bytes of a frame.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleId {
    /// Body control module.
    Gm5 = 0x00,
    /// Diagnostic computer.
    Dia = 0x3F,
    /// Immobilizer.
    Ews = 0x44,
    /// Steering wheel controls.
    Mfl = 0x50,
    /// Climate control panel.
    Ihka = 0x5B,
    /// Radio.
    Rad = 0x68,
    /// Instrument cluster.
    Ike = 0x80,
    /// Broadcast destination.
    All = 0xBF,
    /// Telephone.
    Tel = 0xC8,
    /// Light control module.
    Lcm = 0xD0,
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidModuleId(pub u8);

impl From<ModuleId> for u8 {
    fn from(module: ModuleId) -> Self {
        module as u8
    }
}

impl TryFrom<u8> for ModuleId {
    type Error = InvalidModuleId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ModuleId::Gm5),
            0x3F => Ok(ModuleId::Dia),
            0x44 => Ok(ModuleId::Ews),
            0x50 => Ok(ModuleId::Mfl),
            0x5B => Ok(ModuleId::Ihka),
            0x68 => Ok(ModuleId::Rad),
            0x80 => Ok(ModuleId::Ike),
            0xBF => Ok(ModuleId::All),
            0xC8 => Ok(ModuleId::Tel),
            0xD0 => Ok(ModuleId::Lcm),
            other => Err(InvalidModuleId(other)),
        }
    }
}

impl ModuleId {
    /// Short mnemonic as printed in bus traces.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            ModuleId::Gm5 => "GM5",
            ModuleId::Dia => "DIA",
            ModuleId::Ews => "EWS",
            ModuleId::Mfl => "MFL",
            ModuleId::Ihka => "IHKA",
            ModuleId::Rad => "RAD",
            ModuleId::Ike => "IKE",
            ModuleId::All => "ALL",
            ModuleId::Tel => "TEL",
            ModuleId::Lcm => "LCM",
        }
    }
}

//==================================================================================GM5
/// Input and output addresses of the GM5 body module.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gm5Address {
    DomeLightButton = 0x01,
    CenterLockButton = 0x03,
    TrunkOpenButton = 0x05,
    DriverWindowDownButton = 0x0A,
    DriverWindowUpButton = 0x0B,
    PassengerWindowDownButton = 0x0C,
    PassengerWindowUpButton = 0x0D,
    /// Red LED under the interior mirror.
    AlarmWarningLed = 0x4E,
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidGm5Address(pub u8);

impl From<Gm5Address> for u8 {
    fn from(address: Gm5Address) -> Self {
        address as u8
    }
}

impl TryFrom<u8> for Gm5Address {
    type Error = InvalidGm5Address;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Gm5Address::DomeLightButton),
            0x03 => Ok(Gm5Address::CenterLockButton),
            0x05 => Ok(Gm5Address::TrunkOpenButton),
            0x0A => Ok(Gm5Address::DriverWindowDownButton),
            0x0B => Ok(Gm5Address::DriverWindowUpButton),
            0x0C => Ok(Gm5Address::PassengerWindowDownButton),
            0x0D => Ok(Gm5Address::PassengerWindowUpButton),
            0x4E => Ok(Gm5Address::AlarmWarningLed),
            other => Err(InvalidGm5Address(other)),
        }
    }
}

/// State groups that can be requested from the GM5.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gm5StateGroup {
    Digital = 0x00,
    Analog = 0x01,
}

impl From<Gm5StateGroup> for u8 {
    fn from(group: Gm5StateGroup) -> Self {
        group as u8
    }
}
