use anyhow::{Result, anyhow};
use pico_args::Arguments;
use std::{env, path::PathBuf};

use crate::actions;
use crate::config::ConfigState;
use crate::gestures::GestureAssembler;
use crate::pipeline;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            match topic {
                Some(t) => print_subcmd_help(&t),
                None => print_help(),
            }
            Ok(())
        }

        Some("tap") => {
            let (x, y): (f32, f32) = (
                pargs
                    .free_from_str()
                    .map_err(|_| anyhow!("usage: strokectl tap <x> <y>"))?,
                pargs
                    .free_from_str()
                    .map_err(|_| anyhow!("usage: strokectl tap <x> <y>"))?,
            );
            let mut asm = assembler()?;
            asm.dispatch_tap(x, y)?;
            println!("ok: tapped at ({x}, {y})");
            Ok(())
        }

        Some("scale") => {
            let usage = || anyhow!("usage: strokectl scale <x> <y> <diff>");
            let x: f32 = pargs.free_from_str().map_err(|_| usage())?;
            let y: f32 = pargs.free_from_str().map_err(|_| usage())?;
            let diff: f32 = pargs.free_from_str().map_err(|_| usage())?;
            let mut asm = assembler()?;
            asm.dispatch_scale(x, y, diff)?;
            println!("ok: scaled by {diff} around ({x}, {y})");
            Ok(())
        }

        Some("replay") => {
            let single = pargs.contains("--single");
            let realtime = !pargs.contains("--fast");
            let file: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: strokectl replay <file.jsonl> [--single] [--fast]"))?;
            let mut asm = assembler()?;
            let failed = pipeline::run_replay(&file, single, realtime, &mut asm)?;
            if failed > 0 {
                println!("replayed {} with {failed} failed frames", file.display());
            } else {
                println!("ok: replayed {}", file.display());
            }
            Ok(())
        }

        Some("mirror") => {
            let device: Option<String> = pargs.free_from_str().ok();
            let cfg = ConfigState::load_or_install_default()?;
            let injector = actions::UinputInjector::new(&cfg.profile.output)?;
            let mut asm = GestureAssembler::new(cfg.profile.timing.clone(), injector);
            pipeline::run_mirror(&cfg.profile, device.as_deref(), &mut asm)
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: strokectl use <profile_name>"))?;
            let mut cfg = ConfigState::load_or_install_default()?;
            cfg.set_active(&name)?;
            print_response(&serde_json::json!({
                "ok": true,
                "data": {"active_profile": cfg.active_name}
            }));
            Ok(())
        }

        Some("list") => {
            let cfg = ConfigState::load_or_install_default()?;
            print_response(&serde_json::json!({
                "ok": true,
                "data": {"profiles": cfg.list_profiles(), "active": cfg.active_name}
            }));
            Ok(())
        }

        Some("doctor") => {
            let cfg = ConfigState::load_or_install_default()?;
            print_response(&serde_json::json!({"ok": true, "data": cfg.doctor_report()}));
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn assembler() -> Result<GestureAssembler<Box<dyn actions::Injector>>> {
    let cfg = ConfigState::load_or_install_default()?;
    let injector = actions::default_injector(&cfg.profile.output);
    Ok(GestureAssembler::new(cfg.profile.timing, injector))
}

fn print_help() {
    println!(
        r#"strokectl — synthesize touch gestures on a virtual touchscreen

USAGE:
  strokectl help [command]                Show general or command-specific help
  strokectl tap <x> <y>                   Tap once at (x, y)
  strokectl scale <x> <y> <diff>          Two-finger spread (diff > 0) or pinch
  strokectl replay <file> [--single]      Replay a JSON-lines frame recording
  strokectl mirror [device]               Re-synthesise a touch device's input
  strokectl list                          List profiles
  strokectl use <name>                    Switch active profile
  strokectl doctor                        Diagnose permissions/devices

TIPS:
  - Profiles: ~/.config/strokectl/profiles
  - Active profile pointer: ~/.config/strokectl/active
  - RUST_LOG=debug for verbose output
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "tap" => println!("usage: strokectl tap <x> <y>\nInjects a single one-point tap."),
        "scale" => println!(
            "usage: strokectl scale <x> <y> <diff>\nTwo parallel strokes moving apart (diff > 0) or together."
        ),
        "replay" => println!(
            "usage: strokectl replay <file.jsonl> [--single] [--fast]\nOne MotionFrame per line:\n  {{\"action\":\"move\",\"down_time\":0,\"event_time\":16,\"pointers\":[{{\"x\":10,\"y\":20}}]}}\n--single routes the first pointer through the single-point path, --fast ignores frame timing."
        ),
        "mirror" => println!(
            "usage: strokectl mirror [/dev/input/eventN]\nGrabs a multitouch device and replays its touches until interrupted."
        ),
        "list" => println!("usage: strokectl list\nLists available profiles."),
        "use" => println!("usage: strokectl use <name>\nSwitches the active profile to <name>."),
        "doctor" => println!(
            "usage: strokectl doctor\nChecks uinput permissions and lists detected multitouch devices."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
