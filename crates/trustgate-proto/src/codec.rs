use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    FirmwareCmd, FirmwareRequest, FirmwareResponse, HwSecureCmd, HwSecureReply, HwSecureResponse,
    ProtoError, Result, SecureMode, FIRMWARE_LOAD_REQ_LEN, FIRMWARE_RESP_LEN, HWSECURE_REQ_LEN,
    HWSECURE_RESP_LEN, NO_ERROR, RESPONSE_BIT,
};

/// Largest single message the channel carries. Firmware packages bigger
/// than this are streamed in chunks of at most this size.
pub const MAX_MSG_SIZE: usize = 4096;

pub fn encode_firmware_request(request: &FirmwareRequest) -> Bytes {
    match request {
        FirmwareRequest::Load { package_size } => {
            let mut buf = BytesMut::with_capacity(FIRMWARE_LOAD_REQ_LEN);
            buf.put_u32_le(FirmwareCmd::LoadFirmware as u32);
            buf.put_u64_le(*package_size);
            buf.freeze()
        }
    }
}

pub fn decode_firmware_response(frame: &[u8]) -> Result<FirmwareResponse> {
    let mut buf = frame;
    if buf.remaining() < FIRMWARE_RESP_LEN {
        return Err(ProtoError::ShortResponse {
            got: buf.remaining(),
            need: FIRMWARE_RESP_LEN,
        });
    }
    let cmd = buf.get_u32_le();
    let error = buf.get_u32_le();
    if buf.has_remaining() {
        return Err(ProtoError::TrailingBytes(buf.remaining()));
    }
    expect_echo(FirmwareCmd::LoadFirmware as u32, cmd)?;
    Ok(FirmwareResponse { error })
}

pub fn encode_hwsecure_request(cmd: HwSecureCmd) -> Bytes {
    let mut buf = BytesMut::with_capacity(HWSECURE_REQ_LEN);
    buf.put_u32_le(cmd as u32);
    buf.freeze()
}

/// Decode a hwsecure response to the command that was sent. The mode word
/// is a union on the wire; which member is live follows from `sent`, and
/// it is only read for a successful get response.
pub fn decode_hwsecure_response(sent: HwSecureCmd, frame: &[u8]) -> Result<HwSecureResponse> {
    let mut buf = frame;
    if buf.remaining() < HWSECURE_RESP_LEN {
        return Err(ProtoError::ShortResponse {
            got: buf.remaining(),
            need: HWSECURE_RESP_LEN,
        });
    }
    let cmd = buf.get_u32_le();
    let result = buf.get_u32_le();
    let mode = buf.get_u32_le();
    if buf.has_remaining() {
        return Err(ProtoError::TrailingBytes(buf.remaining()));
    }
    expect_echo(sent as u32, cmd)?;

    let reply = if result != NO_ERROR {
        HwSecureReply::Ack
    } else {
        match sent {
            HwSecureCmd::GetG2dSecureMode => HwSecureReply::G2dMode(decode_mode(mode)?),
            HwSecureCmd::GetImeSecureMode => HwSecureReply::ImeMode(decode_mode(mode)?),
            _ => HwSecureReply::Ack,
        }
    };
    Ok(HwSecureResponse { result, reply })
}

fn decode_mode(mode: u32) -> Result<SecureMode> {
    match mode {
        0 => Ok(SecureMode::NonSecure),
        1 => Ok(SecureMode::Secure),
        _ => Err(ProtoError::InvalidMessage("secure mode out of range")),
    }
}

fn expect_echo(sent: u32, echoed: u32) -> Result<()> {
    if echoed != (sent | RESPONSE_BIT) {
        return Err(ProtoError::CommandMismatch { sent, echoed });
    }
    Ok(())
}
