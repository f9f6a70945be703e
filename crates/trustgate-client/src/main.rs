use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use trustgate_core::{load_firmware_package_with, HwSecureClient, IpcConfig, SecureFlag};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    if args.help {
        print_help();
        return Ok(());
    }
    if args.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = IpcConfig::from_env();
    if let Some(dir) = args.ipc_dir.clone() {
        config.ipc_dir = PathBuf::from(dir);
    }
    if let Some(ms) = args.timeout_ms {
        config.io_timeout = if ms == 0 {
            None
        } else {
            Some(Duration::from_millis(ms))
        };
    }

    if let Some(path) = args.load.as_deref() {
        let bytes_loaded = load_firmware_package_with(&config, path)?;
        if args.json {
            emit_json(
                &LoadReport {
                    package: path,
                    bytes_loaded,
                },
                args.json_compact,
            )?;
        } else {
            println!("loaded {bytes_loaded} bytes from {path}");
        }
        return Ok(());
    }

    let mut client = HwSecureClient::with_config(config);

    if let Some(value) = args.enable.as_deref() {
        let flag = parse_secure_flag(value)?;
        client.enable(flag)?;
        report_toggle(&args, flag, "enabled")?;
        return Ok(());
    }

    if let Some(value) = args.disable.as_deref() {
        let flag = parse_secure_flag(value)?;
        client.disable(flag)?;
        report_toggle(&args, flag, "disabled")?;
        return Ok(());
    }

    if let Some(value) = args.get.as_deref() {
        let flag = parse_secure_flag(value)?;
        let secure = client.get(flag)?;
        if args.json {
            emit_json(
                &ModeReport {
                    flag: flag_name(flag),
                    secure,
                },
                args.json_compact,
            )?;
        } else {
            println!(
                "{}: {}",
                flag_name(flag),
                if secure { "secure" } else { "non-secure" }
            );
        }
        return Ok(());
    }

    eprintln!("No command provided. Use --load, --enable, --disable or --get.");
    Ok(())
}

fn report_toggle(args: &Args, flag: SecureFlag, state: &str) -> Result<()> {
    if args.json {
        emit_json(
            &ToggleReport {
                flag: flag_name(flag),
                state,
            },
            args.json_compact,
        )?;
    } else {
        println!("{} {}", flag_name(flag), state);
    }
    Ok(())
}

fn emit_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if compact {
        serde_json::to_writer(&mut handle, value)?;
    } else {
        serde_json::to_writer_pretty(&mut handle, value)?;
    }
    writeln!(handle)?;
    Ok(())
}

fn parse_secure_flag(value: &str) -> Result<SecureFlag> {
    match value.to_ascii_lowercase().as_str() {
        "g2d" => Ok(SecureFlag::G2d),
        "ime" | "secureime" | "secure-ime" => Ok(SecureFlag::SecureIme),
        other => Err(anyhow::anyhow!("unknown secure flag: {other}")),
    }
}

fn flag_name(flag: SecureFlag) -> &'static str {
    match flag {
        SecureFlag::G2d => "g2d",
        SecureFlag::SecureIme => "secureime",
    }
}

#[derive(Serialize)]
struct LoadReport<'a> {
    package: &'a str,
    bytes_loaded: u64,
}

#[derive(Serialize)]
struct ToggleReport<'a> {
    flag: &'a str,
    state: &'a str,
}

#[derive(Serialize)]
struct ModeReport<'a> {
    flag: &'a str,
    secure: bool,
}

#[derive(Debug)]
struct Args {
    ipc_dir: Option<String>,
    timeout_ms: Option<u64>,
    load: Option<String>,
    enable: Option<String>,
    disable: Option<String>,
    get: Option<String>,
    json: bool,
    json_compact: bool,
    help: bool,
    version: bool,
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        ipc_dir: None,
        timeout_ms: None,
        load: None,
        enable: None,
        disable: None,
        get: None,
        json: false,
        json_compact: false,
        help: false,
        version: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ipc-dir" => parsed.ipc_dir = args.next(),
            "--timeout-ms" => {
                if let Some(value) = args.next() {
                    parsed.timeout_ms = value.parse().ok();
                }
            }
            "--load" => parsed.load = args.next(),
            "--enable" => parsed.enable = args.next(),
            "--disable" => parsed.disable = args.next(),
            "--get" => parsed.get = args.next(),
            "--json" => parsed.json = true,
            "--json-compact" => {
                parsed.json = true;
                parsed.json_compact = true;
            }
            "-h" | "--help" => parsed.help = true,
            "--version" => parsed.version = true,
            _ => {}
        }
    }

    parsed
}

fn print_help() {
    println!("trustgate-client usage:\n");
    println!("  --load <path> [--json|--json-compact]");
    println!("  --enable <g2d|ime> [--json|--json-compact]");
    println!("  --disable <g2d|ime> [--json|--json-compact]");
    println!("  --get <g2d|ime> [--json|--json-compact]");
    println!("  --ipc-dir <dir>");
    println!("  --timeout-ms <n>\n");
    println!("  --version\n");
    println!("Notes:");
    println!("  --load streams a signed firmware package to the secure world");
    println!("  and prints the number of bytes transferred.");
    println!("  --timeout-ms bounds each blocking exchange (0 disables the bound).");
    println!("  TRUSTGATE_IPC_DIR and TRUSTGATE_CONFIG are honored before flags.");
}

#[cfg(test)]
mod tests {
    use super::{flag_name, parse_secure_flag};
    use trustgate_core::SecureFlag;

    #[test]
    fn parse_secure_flag_names() {
        assert_eq!(parse_secure_flag("g2d").unwrap(), SecureFlag::G2d);
        assert_eq!(parse_secure_flag("G2D").unwrap(), SecureFlag::G2d);
        assert_eq!(parse_secure_flag("ime").unwrap(), SecureFlag::SecureIme);
        assert_eq!(parse_secure_flag("secureime").unwrap(), SecureFlag::SecureIme);
        assert_eq!(parse_secure_flag("secure-ime").unwrap(), SecureFlag::SecureIme);
        assert!(parse_secure_flag("vpu").is_err());
    }

    #[test]
    fn flag_names_are_stable() {
        assert_eq!(flag_name(SecureFlag::G2d), "g2d");
        assert_eq!(flag_name(SecureFlag::SecureIme), "secureime");
    }
}
