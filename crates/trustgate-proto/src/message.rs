/// Secure-world port served by the firmware loader.
pub const FIRMWARE_LOADER_PORT: &str = "com.android.trusty.firmwareloader";
/// Secure-world port served by the hwsecure client service.
pub const HWSECURE_CLIENT_PORT: &str = "com.android.trusty.hwsecure.client";

/// Set by the service when echoing a command back in a response.
pub const RESPONSE_BIT: u32 = 1;
/// Command indices are shifted left by this much, keeping request codes even.
pub const CMD_SHIFT: u32 = 1;

pub const FIRMWARE_LOAD_REQ_LEN: usize = 12;
pub const FIRMWARE_RESP_LEN: usize = 8;
pub const HWSECURE_REQ_LEN: usize = 4;
pub const HWSECURE_RESP_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FirmwareCmd {
    LoadFirmware = 0 << CMD_SHIFT,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum HwSecureCmd {
    EnableG2dSecureMode = 1 << CMD_SHIFT,
    DisableG2dSecureMode = 2 << CMD_SHIFT,
    GetG2dSecureMode = 3 << CMD_SHIFT,
    EnableImeSecurePolicy = 4 << CMD_SHIFT,
    DisableImeSecurePolicy = 5 << CMD_SHIFT,
    GetImeSecureMode = 6 << CMD_SHIFT,
}

/// Hardware secure-mode flags reachable through the hwsecure port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureFlag {
    G2d,
    SecureIme,
}

impl SecureFlag {
    pub fn enable_cmd(self) -> HwSecureCmd {
        match self {
            SecureFlag::G2d => HwSecureCmd::EnableG2dSecureMode,
            SecureFlag::SecureIme => HwSecureCmd::EnableImeSecurePolicy,
        }
    }

    pub fn disable_cmd(self) -> HwSecureCmd {
        match self {
            SecureFlag::G2d => HwSecureCmd::DisableG2dSecureMode,
            SecureFlag::SecureIme => HwSecureCmd::DisableImeSecurePolicy,
        }
    }

    pub fn get_cmd(self) -> HwSecureCmd {
        match self {
            SecureFlag::G2d => HwSecureCmd::GetG2dSecureMode,
            SecureFlag::SecureIme => HwSecureCmd::GetImeSecureMode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SecureMode {
    NonSecure = 0,
    Secure = 1,
}

impl SecureMode {
    pub fn is_secure(self) -> bool {
        self == SecureMode::Secure
    }
}

#[derive(Debug, Clone)]
pub enum FirmwareRequest {
    Load { package_size: u64 },
}

/// Decoded firmware-loader response. `error` is the raw wire status;
/// classify it with [`status`](FirmwareResponse::status).
#[derive(Debug, Clone, Copy)]
pub struct FirmwareResponse {
    pub error: u32,
}

impl FirmwareResponse {
    pub fn status(&self) -> Result<(), crate::ServiceError> {
        crate::ServiceError::check(self.error)
    }
}

/// The hwsecure response's mode word, already bound to the command that
/// was sent. Toggle acknowledgements and error responses carry `Ack`;
/// their mode word is never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwSecureReply {
    Ack,
    G2dMode(SecureMode),
    ImeMode(SecureMode),
}

#[derive(Debug, Clone, Copy)]
pub struct HwSecureResponse {
    pub result: u32,
    pub reply: HwSecureReply,
}

impl HwSecureResponse {
    pub fn status(&self) -> Result<(), crate::ServiceError> {
        crate::ServiceError::check(self.result)
    }
}
