use tracing::debug;

use trustgate_proto::{
    decode_hwsecure_response, encode_hwsecure_request, HwSecureCmd, HwSecureReply, ProtoError,
    SecureFlag, HWSECURE_CLIENT_PORT, HWSECURE_RESP_LEN,
};

use crate::channel::{Channel, TipcChannel};
use crate::config::IpcConfig;
use crate::{ClientError, Result};

/// Client for the hardware secure-mode flags served on
/// `com.android.trusty.hwsecure.client`.
///
/// Every operation opens its own connection and releases it on return.
/// Concurrent toggles from different callers are not serialized here;
/// ordering is the service's concern. A single instance runs at most one
/// operation at a time.
pub struct HwSecureClient {
    config: IpcConfig,
}

impl HwSecureClient {
    pub fn new() -> Self {
        Self::with_config(IpcConfig::from_env())
    }

    pub fn with_config(config: IpcConfig) -> Self {
        Self { config }
    }

    pub fn enable(&mut self, flag: SecureFlag) -> Result<()> {
        let mut channel = self.connect()?;
        toggle_over(&mut channel, flag.enable_cmd())
    }

    pub fn disable(&mut self, flag: SecureFlag) -> Result<()> {
        let mut channel = self.connect()?;
        toggle_over(&mut channel, flag.disable_cmd())
    }

    pub fn get(&mut self, flag: SecureFlag) -> Result<bool> {
        let mut channel = self.connect()?;
        query_over(&mut channel, flag)
    }

    fn connect(&self) -> Result<TipcChannel> {
        let channel = TipcChannel::connect(&self.config.endpoint(HWSECURE_CLIENT_PORT))?;
        channel.set_io_timeout(self.config.io_timeout)?;
        Ok(channel)
    }
}

impl Default for HwSecureClient {
    fn default() -> Self {
        Self::new()
    }
}

fn exchange_over<C: Channel>(channel: &mut C, cmd: HwSecureCmd) -> Result<HwSecureReply> {
    let frame = channel.call(&encode_hwsecure_request(cmd), HWSECURE_RESP_LEN)?;
    let response = decode_hwsecure_response(cmd, &frame)?;
    response.status()?;
    debug!(?cmd, "secure mode exchange complete");
    Ok(response.reply)
}

fn toggle_over<C: Channel>(channel: &mut C, cmd: HwSecureCmd) -> Result<()> {
    exchange_over(channel, cmd).map(drop)
}

fn query_over<C: Channel>(channel: &mut C, flag: SecureFlag) -> Result<bool> {
    let reply = exchange_over(channel, flag.get_cmd())?;
    match (flag, reply) {
        (SecureFlag::G2d, HwSecureReply::G2dMode(mode)) => Ok(mode.is_secure()),
        (SecureFlag::SecureIme, HwSecureReply::ImeMode(mode)) => Ok(mode.is_secure()),
        _ => Err(ClientError::Protocol(ProtoError::InvalidMessage(
            "reply does not carry the requested mode",
        ))),
    }
}
