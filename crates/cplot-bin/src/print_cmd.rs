use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use core_canvas::{CanvasLayout, Orientation as CanvasOrientation, PageOptions};
use core_config::ConfigFile;
use core_device::{DeviceSession, SessionOptions};
use core_ebb::Command;
use core_error::{PlotError, Result};
use core_fonts::FontRegistry;
use core_markdown::MarkdownOptions;
use core_stepper::{block_to_phases, EBB_INTERVAL_S};
use core_text::{Alignment, LayoutOptions};
use crossbeam_channel::Receiver;
use tracing::info;

use crate::cli::{OrientationArg, PreviewFormatArg, PrintArgs};
use crate::profile::MotionProfile;
use crate::segments::paths_to_segments;

const COMMAND_TIMEOUT: Duration = Duration::from_millis(500);
const MIN_COMMAND_INTERVAL: Duration = Duration::from_millis(5);

/// Effective print options after merging CLI flags over the persisted
/// config over the (single, built-in) motion profile, outermost-wins.
struct EffectiveOptions {
    page: PageOptions,
    family_hint: Option<String>,
    point_size_pt: f64,
    markdown: bool,
    dry_run: bool,
    preview_format: Option<PreviewFormatArg>,
    output: Option<PathBuf>,
    device_alias: Option<String>,
    nominal_feed_mm_s: f64,
    nominal_accel_mm_s2: f64,
}

fn resolve(args: &PrintArgs, config: &ConfigFile) -> EffectiveOptions {
    let orientation = match args.orientation {
        Some(OrientationArg::Portrait) => CanvasOrientation::Portrait,
        Some(OrientationArg::Landscape) => CanvasOrientation::Landscape,
        None => match config.orientation {
            core_config::Orientation::Portrait => CanvasOrientation::Portrait,
            core_config::Orientation::Landscape => CanvasOrientation::Landscape,
        },
    };
    let margin = args.margin_mm;
    let page = PageOptions {
        paper_width_mm: args.paper_width_mm.unwrap_or(config.paper_width_mm),
        paper_height_mm: args.paper_height_mm.unwrap_or(config.paper_height_mm),
        margin_top_mm: margin.unwrap_or(config.margin_top_mm),
        margin_right_mm: margin.unwrap_or(config.margin_right_mm),
        margin_bottom_mm: margin.unwrap_or(config.margin_bottom_mm),
        margin_left_mm: margin.unwrap_or(config.margin_left_mm),
        orientation,
        fit_to_frame: args.fit_to_frame.unwrap_or(true),
    };
    EffectiveOptions {
        page,
        family_hint: args.family.clone().or_else(|| Some(config.default_family_id.clone())),
        point_size_pt: args.point_size.unwrap_or(config.default_point_size_pt),
        markdown: args.markdown,
        dry_run: args.dry_run,
        preview_format: args.preview_format,
        output: args.output.clone(),
        device_alias: args.device.clone().or_else(|| config.default_device_alias.clone()),
        nominal_feed_mm_s: config.nominal_feed_mm_s,
        nominal_accel_mm_s2: config.nominal_accel_mm_s2,
    }
}

fn read_input(args: &PrintArgs) -> Result<String> {
    match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| PlotError::resource(format!("reading {}: {e}", path.display()))),
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Err(PlotError::argument(
                    "no --file given and standard input is a terminal",
                ));
            }
            let mut buf = String::new();
            stdin
                .lock()
                .read_to_string(&mut buf)
                .map_err(|e| PlotError::resource(format!("reading standard input: {e}")))?;
            Ok(buf)
        }
    }
}

fn render(effective: &EffectiveOptions, text: &str, registry: &FontRegistry) -> Result<CanvasLayout> {
    if effective.markdown {
        let options = MarkdownOptions {
            family_hint: effective.family_hint.clone(),
            base_pt: effective.point_size_pt,
            ..MarkdownOptions::default()
        };
        core_canvas::compose_markdown(text, &options, &effective.page, registry)
    } else {
        let options = LayoutOptions {
            family_hint: effective.family_hint.clone(),
            point_size_pt: effective.point_size_pt,
            alignment: Alignment::Left,
            ..LayoutOptions::default()
        };
        core_canvas::compose_text(text, &[], &options, &effective.page, registry)
    }
}

fn write_preview(layout: &CanvasLayout, format: PreviewFormatArg, output: &Option<PathBuf>) -> Result<()> {
    let format = match format {
        PreviewFormatArg::Svg => core_preview::PreviewFormat::Svg,
        PreviewFormatArg::Png => core_preview::PreviewFormat::Png,
    };
    let emitter = core_preview::emitter_for(format);
    let bytes = emitter.emit(layout)?;
    match output {
        Some(path) => std::fs::write(path, &bytes)
            .map_err(|e| PlotError::resource(format!("writing {}: {e}", path.display())))?,
        None => {
            std::io::stdout()
                .write_all(&bytes)
                .map_err(|e| PlotError::io(format!("writing preview to stdout: {e}")))?;
        }
    }
    Ok(())
}

/// Run the `print` command: resolve options, render, plan, step, and
/// either preview or submit to a device session. `cancel` fires once on
/// a user interrupt; it is polled between phase submissions so an
/// in-progress motion sequence can reach a safe `ES` before teardown.
pub fn run(args: PrintArgs, cancel: Receiver<()>) -> Result<()> {
    let config_path = core_config::discover();
    let config = core_config::load(Some(&config_path))?;
    let effective = resolve(&args, &config);

    let registry = crate::fonts_cmd::load_registry()?;
    let text = read_input(&args)?;
    let layout = render(&effective, &text, &registry)?;

    if let Some(format) = effective.preview_format {
        write_preview(&layout, format, &effective.output)?;
    }

    let profile = MotionProfile::builtin();
    let limits = profile.planner_limits(effective.nominal_feed_mm_s, effective.nominal_accel_mm_s2);
    let (start, plan_segments) = paths_to_segments(&layout.paths, effective.nominal_feed_mm_s, profile.pen_up_feed_mm_s);
    let blocks = core_planner::plan(start, &plan_segments, &limits)?;

    info!(
        target: "cplot_bin::print",
        blocks = blocks.len(),
        scale_applied = layout.scale_applied,
        "planned print"
    );

    if effective.dry_run {
        print_diagnostics(&blocks, &profile)?;
        return Ok(());
    }

    submit_to_device(&blocks, &profile, effective.device_alias, cancel)
}

fn print_diagnostics(blocks: &[core_planner::PlanBlock], profile: &MotionProfile) -> Result<()> {
    let settings = profile.stepper_settings();
    for block in blocks {
        let phases = block_to_phases(block, &settings)?;
        println!(
            "block {seq}: len={len:.3}mm pen_down={pen} entry={entry:.2} cruise={cruise:.2} exit={exit:.2} phases={n}",
            seq = block.seq,
            len = block.length_mm,
            pen = block.pen_down,
            entry = block.entry_speed_mm_s,
            cruise = block.cruise_speed_mm_s,
            exit = block.exit_speed_mm_s,
            n = phases.len(),
        );
        for phase in &phases {
            println!(
                "  phase {idx}: steps=({a},{b}) duration={dur:.6}s",
                idx = phase.index,
                a = phase.steps_a,
                b = phase.steps_b,
                dur = phase.duration_s,
            );
        }
    }
    Ok(())
}

fn submit_to_device(
    blocks: &[core_planner::PlanBlock],
    profile: &MotionProfile,
    device_alias: Option<String>,
    cancel: Receiver<()>,
) -> Result<()> {
    let settings = profile.stepper_settings();
    let options = SessionOptions {
        lock_path: crate::lock_path(),
        alias: device_alias,
        settings,
        command_timeout: COMMAND_TIMEOUT,
        min_command_interval: MIN_COMMAND_INTERVAL,
    };

    let mut session = DeviceSession::open(options)?;
    let mut pen_down = false;

    let outcome = (|| -> Result<()> {
        for block in blocks {
            if cancel.try_recv().is_ok() {
                return Err(PlotError::internal("print cancelled by user"));
            }
            if block.pen_down != pen_down {
                pen_down = block.pen_down;
                // `SP` state is 1 = pen up, 0 = pen down.
                session.execute(|c| c.exec(&Command::pen(!pen_down, Some(profile.servo_settle_ms), None)).map(|_| ()))?;
            }
            for phase in block_to_phases(block, &settings)? {
                if cancel.try_recv().is_ok() {
                    return Err(PlotError::internal("print cancelled by user"));
                }
                let intervals = ((phase.duration_s / EBB_INTERVAL_S).round() as i64).max(1) as u32;
                let cmd = Command::low_level_move_time(
                    intervals,
                    phase.rate_start_a as i32,
                    phase.accel_a,
                    phase.rate_start_b as i32,
                    phase.accel_b,
                    None,
                )?;
                session.execute(|c| c.exec(&cmd).map(|_| ()))?;
            }
        }
        session.wait_idle()
    })();

    if outcome.is_err() {
        // Best-effort: an already-broken link shouldn't mask the original error.
        let _ = session.execute(|c| c.emergency_stop());
    }
    outcome
}
