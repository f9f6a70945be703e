mod codec;
mod error;
mod message;

pub use codec::{
    decode_firmware_response, decode_hwsecure_response, encode_firmware_request,
    encode_hwsecure_request, MAX_MSG_SIZE,
};
pub use error::{
    ServiceError, ERR_ALREADY_EXISTS, ERR_INTERNAL, ERR_INVALID_CMD, ERR_INVALID_VERSION,
    ERR_LOADING_FAILED, ERR_NOT_ENCRYPTED, ERR_NO_MEMORY, ERR_POLICY_VIOLATION, ERR_UNKNOWN_CMD,
    ERR_VERIFICATION_FAILED, NO_ERROR,
};
pub use message::{
    FirmwareCmd, FirmwareRequest, FirmwareResponse, HwSecureCmd, HwSecureReply, HwSecureResponse,
    SecureFlag, SecureMode, CMD_SHIFT, FIRMWARE_LOADER_PORT, FIRMWARE_LOAD_REQ_LEN,
    FIRMWARE_RESP_LEN, HWSECURE_CLIENT_PORT, HWSECURE_REQ_LEN, HWSECURE_RESP_LEN, RESPONSE_BIT,
};

pub type Result<T> = std::result::Result<T, ProtoError>;

#[derive(thiserror::Error, Debug)]
pub enum ProtoError {
    #[error("response truncated: got {got} bytes, need {need}")]
    ShortResponse { got: usize, need: usize },
    #[error("unexpected trailing bytes: {0}")]
    TrailingBytes(usize),
    #[error("command mismatch: sent {sent:#x}, response echoed {echoed:#x}")]
    CommandMismatch { sent: u32, echoed: u32 },
    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),
    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),
}
