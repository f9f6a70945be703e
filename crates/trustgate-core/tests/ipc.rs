use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::thread;

use trustgate_core::{
    load_firmware_package_with, ClientError, HwSecureClient, IpcConfig, SecureFlag, ServiceError,
};
use trustgate_proto::{
    FirmwareCmd, HwSecureCmd, ERR_POLICY_VIOLATION, NO_ERROR, RESPONSE_BIT,
    FIRMWARE_LOADER_PORT, HWSECURE_CLIENT_PORT,
};

fn test_config(name: &str) -> IpcConfig {
    let dir = std::env::temp_dir().join(format!("trustgate-test-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    IpcConfig {
        ipc_dir: dir,
        io_timeout: None,
    }
}

fn write_firmware_response(stream: &mut UnixStream, error: u32) {
    let mut frame = Vec::with_capacity(8);
    frame.extend_from_slice(&(FirmwareCmd::LoadFirmware as u32 | RESPONSE_BIT).to_le_bytes());
    frame.extend_from_slice(&error.to_le_bytes());
    stream.write_all(&frame).unwrap();
}

/// One-connection firmware loader: answer the announcement with `first`,
/// consume the payload if accepted, answer the verdict with `last`.
/// Returns the payload bytes the service received.
fn firmware_service(listener: UnixListener, first: u32, last: u32) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let mut request = [0u8; 12];
        stream.read_exact(&mut request).unwrap();
        let cmd = u32::from_le_bytes(request[0..4].try_into().unwrap());
        assert_eq!(cmd, FirmwareCmd::LoadFirmware as u32);
        let package_size = u64::from_le_bytes(request[4..12].try_into().unwrap());

        write_firmware_response(&mut stream, first);
        if first != NO_ERROR {
            // A rejected client must hang up without sending payload.
            let mut probe = [0u8; 1];
            assert_eq!(stream.read(&mut probe).unwrap(), 0);
            return Vec::new();
        }

        let mut payload = vec![0u8; package_size as usize];
        stream.read_exact(&mut payload).unwrap();
        write_firmware_response(&mut stream, last);
        payload
    })
}

/// Stateful hwsecure service answering `connections` consecutive
/// single-command sessions.
fn hwsecure_service(listener: UnixListener, connections: usize) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut g2d = false;
        let mut ime = false;
        for _ in 0..connections {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4];
            stream.read_exact(&mut request).unwrap();
            let cmd = u32::from_le_bytes(request);

            let mode = match cmd {
                x if x == HwSecureCmd::EnableG2dSecureMode as u32 => {
                    g2d = true;
                    0
                }
                x if x == HwSecureCmd::DisableG2dSecureMode as u32 => {
                    g2d = false;
                    0
                }
                x if x == HwSecureCmd::EnableImeSecurePolicy as u32 => {
                    ime = true;
                    0
                }
                x if x == HwSecureCmd::DisableImeSecurePolicy as u32 => {
                    ime = false;
                    0
                }
                x if x == HwSecureCmd::GetG2dSecureMode as u32 => g2d as u32,
                x if x == HwSecureCmd::GetImeSecureMode as u32 => ime as u32,
                other => panic!("unexpected command {other:#x}"),
            };

            let mut frame = Vec::with_capacity(12);
            frame.extend_from_slice(&(cmd | RESPONSE_BIT).to_le_bytes());
            frame.extend_from_slice(&NO_ERROR.to_le_bytes());
            frame.extend_from_slice(&mode.to_le_bytes());
            stream.write_all(&frame).unwrap();
        }
    })
}

fn write_package(dir: &PathBuf, len: usize) -> PathBuf {
    let path = dir.join("package.bin");
    let contents: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn load_firmware_package_roundtrip() {
    let config = test_config("load-ok");
    let listener = UnixListener::bind(config.endpoint(FIRMWARE_LOADER_PORT)).unwrap();
    let service = firmware_service(listener, NO_ERROR, NO_ERROR);

    let package = write_package(&config.ipc_dir, 10_000);
    let loaded = load_firmware_package_with(&config, &package).unwrap();
    assert_eq!(loaded, 10_000);

    let received = service.join().unwrap();
    assert_eq!(received, fs::read(&package).unwrap());
}

#[test]
fn load_firmware_package_rejected_up_front() {
    let config = test_config("load-rejected");
    let listener = UnixListener::bind(config.endpoint(FIRMWARE_LOADER_PORT)).unwrap();
    let service = firmware_service(listener, ERR_POLICY_VIOLATION, NO_ERROR);

    let package = write_package(&config.ipc_dir, 4096);
    let result = load_firmware_package_with(&config, &package);
    assert!(matches!(
        result,
        Err(ClientError::Service(ServiceError::PolicyViolation))
    ));

    // The service saw the announcement and nothing else.
    assert!(service.join().unwrap().is_empty());
}

#[test]
fn load_firmware_package_missing_file() {
    let config = test_config("load-missing");
    let result = load_firmware_package_with(&config, config.ipc_dir.join("absent.bin"));
    assert!(matches!(result, Err(ClientError::NotFound(_))));
}

#[test]
fn hwsecure_enable_then_get() {
    let config = test_config("hwsecure");
    let listener = UnixListener::bind(config.endpoint(HWSECURE_CLIENT_PORT)).unwrap();
    let service = hwsecure_service(listener, 4);

    let mut client = HwSecureClient::with_config(config);
    client.enable(SecureFlag::G2d).unwrap();
    assert!(client.get(SecureFlag::G2d).unwrap());
    client.disable(SecureFlag::G2d).unwrap();
    assert!(!client.get(SecureFlag::G2d).unwrap());

    service.join().unwrap();
}

#[test]
fn unreachable_port_is_a_connection_error() {
    let config = test_config("unreachable");
    let mut client = HwSecureClient::with_config(config);
    let result = client.enable(SecureFlag::SecureIme);
    assert!(matches!(result, Err(ClientError::Connection(_))));
}
