use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use meta_core::Vec3;
use meta_runtime::{Engine, EngineConfig, EngineError, FrameSnapshot, RenderSurface};

const SURFACE_ID: &str = "headless";

pub struct RunOptions {
    pub frames: u64,
    pub dt: f64,
    pub velocity: Option<Vec3>,
    pub config: Option<PathBuf>,
    pub realtime: bool,
    pub verbose: bool,
    pub json: bool,
}

/// Keeps the latest frame and optionally echoes every frame to stdout.
#[derive(Debug)]
struct ConsoleSurface {
    verbose: bool,
    last: Option<FrameSnapshot>,
}

impl RenderSurface for ConsoleSurface {
    fn id(&self) -> &str {
        SURFACE_ID
    }

    fn present(&mut self, frame: &FrameSnapshot) {
        if self.verbose {
            let label = format!("[frame {:>4}]", frame.frame).dimmed();
            let entities: Vec<String> = frame
                .entities
                .iter()
                .map(|e| {
                    let pos = e.position.map(|p| format!(" pos={p}")).unwrap_or_default();
                    let rot = e.rotation.map(|r| format!(" rot={r}")).unwrap_or_default();
                    format!("{}{pos}{rot}", e.name.cyan())
                })
                .collect();
            println!("  {label} dt={:.4} {}", frame.dt, entities.join("  "));
        }
        self.last = Some(frame.clone());
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

fn load_config(options: &RunOptions) -> Result<EngineConfig, String> {
    let mut config = match &options.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read '{}': {e}", path.display()))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("invalid config '{}': {e}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(velocity) = options.velocity {
        config = config.with_velocity(velocity);
    }
    Ok(config)
}

pub fn run(file: &Path, options: &RunOptions) -> Result<(), String> {
    let source = super::read_script(file)?;
    let config = load_config(options)?;

    let mut engine = Engine::new(config);
    engine.register_surface(Box::new(ConsoleSurface {
        verbose: options.verbose && !options.json,
        last: None,
    }));

    if let Err(err) = engine.start_app(SURFACE_ID, &source) {
        let message = load_failure(&err);
        let diagnostics = err.diagnostics();
        if diagnostics.is_empty() {
            eprintln!("{:?}", miette::Report::new(err));
        } else {
            super::print_diagnostics(&source, file, &diagnostics);
        }
        return Err(message);
    }

    if options.realtime {
        run_realtime(&mut engine, options)?;
    } else {
        for _ in 0..options.frames {
            engine
                .tick_surface(SURFACE_ID, options.dt)
                .map_err(|e| e.to_string())?;
        }
    }

    let last = engine
        .surface_as::<ConsoleSurface>(SURFACE_ID)
        .and_then(|s| s.last.clone());
    let snapshot = match last {
        Some(snapshot) => snapshot,
        None => engine
            .simulation(SURFACE_ID)
            .map(|s| s.snapshot())
            .ok_or_else(|| EngineError::NotRunning(SURFACE_ID.into()).to_string())?,
    };

    if options.json {
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| format!("failed to serialize snapshot: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "  {} '{}' {}",
        "Ran".bold(),
        file.display(),
        format!("({} frames, {:.3}s simulated)", snapshot.frame, snapshot.elapsed).dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Entity", "Position", "Velocity", "Rotation"]);
    for entity in &snapshot.entities {
        table.add_row(vec![
            entity.name.clone(),
            super::format_vec3(entity.position),
            super::format_vec3(entity.velocity),
            super::format_vec3(entity.rotation),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn run_realtime(engine: &mut Engine, options: &RunOptions) -> Result<(), String> {
    let start = Instant::now();
    let pace = Duration::try_from_secs_f64(options.dt).unwrap_or_default();
    for _ in 0..options.frames {
        engine
            .frame_surface(SURFACE_ID, start.elapsed().as_secs_f64())
            .map_err(|e| e.to_string())?;
        std::thread::sleep(pace);
    }
    Ok(())
}

fn load_failure(err: &EngineError) -> String {
    match err {
        EngineError::Syntax(errors) => format!("script has {} syntax error(s)", errors.len()),
        EngineError::Resolution(_) => "script failed to resolve".to_string(),
        other => other.to_string(),
    }
}
