// Example runner for the `rover_vision` controller.
//
// Without arguments it drives the controller against a small synthetic scene:
// the robot wanders toward an obstacle, inspects it, turns away, and later holds
// the stay key long enough to switch into stationary watch mode. A second, blind
// robot patrols through the view, so some inspections see it move. With a directory
// of images the camera replays those instead.

use anyhow::{Context, Result};
use rover_vision::core_modules::pixel::pixel::Pixel;
use rover_vision::core_modules::utils::image_helper::image_helper;
use rover_vision::devices::Camera;
use rover_vision::devices::playback::PlaybackCamera;
use rover_vision::devices::scripted::{
    FixedSteps, ObstaclePatrol, RecordingMotors, ScriptedCamera, ScriptedKeyboard,
    ScriptedProximity,
};
use rover_vision::devices::Stepper;
use rover_vision::{
    BehaviorConfig, BehaviorStateMachine, Controller, Frame, PipelineConfig, VisionPipeline,
};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SCENE_WIDTH: u32 = 160;
const SCENE_HEIGHT: u32 = 120;
const DEFAULT_TICKS: u64 = 600;
const DEFAULT_TIMESTEP_MS: u64 = 32;
/// Length of one approach/retreat cycle of the synthetic obstacle.
const APPROACH_PERIOD: u64 = 200;
const BLOCK_WIDTH: u32 = 30;
/// Simulator key code for "no key pressed".
const NO_KEY: i32 = -1;
const STAY_KEY: i32 = 'S' as i32;
/// `(key code, ticks held)` segments of the demo keyboard script.
const KEY_SCRIPT: [(i32, usize); 4] = [
    (NO_KEY, 430),
    (STAY_KEY, 30),
    (NO_KEY, 60),
    (STAY_KEY, 30),
];

struct RunArgs {
    ticks: u64,
    timestep: Duration,
    frames_dir: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
}

impl RunArgs {
    fn parse() -> Result<Self> {
        let args: Vec<String> = env::args().collect();
        if args.iter().any(|a| a == "-h" || a == "--help") {
            println!("Usage: rover_vision [ticks] [timestep_ms] [frames_dir|-] [snapshot_dir]");
            std::process::exit(0);
        }
        let ticks = match args.get(1) {
            Some(raw) => raw.parse().with_context(|| format!("invalid tick count {raw:?}"))?,
            None => DEFAULT_TICKS,
        };
        let timestep_ms = match args.get(2) {
            Some(raw) => raw.parse().with_context(|| format!("invalid timestep {raw:?}"))?,
            None => DEFAULT_TIMESTEP_MS,
        };
        Ok(Self {
            ticks,
            timestep: Duration::from_millis(timestep_ms.max(1)),
            frames_dir: args.get(3).filter(|a| a.as_str() != "-").map(PathBuf::from),
            snapshot_dir: args.get(4).map(PathBuf::from),
        })
    }
}

/// The patrolling robot seen as a bright block. It slides across the view while its
/// patrol drives forward, bouncing off the frame sides, and holds still while it
/// turns.
struct PatrolScene {
    patrol: ObstaclePatrol,
    block_x: f64,
    heading: f64,
}

impl PatrolScene {
    fn new() -> Self {
        Self {
            patrol: ObstaclePatrol::default(),
            block_x: 0.0,
            heading: 1.0,
        }
    }

    fn render(&mut self) -> Option<Frame> {
        let command = self.patrol.next_command();
        let limit = (SCENE_WIDTH - BLOCK_WIDTH) as f64;
        self.block_x += self.heading * (command.left + command.right) / 2.0;
        if !(0.0..=limit).contains(&self.block_x) {
            self.block_x = self.block_x.clamp(0.0, limit);
            self.heading = -self.heading;
        }
        synthetic_frame(self.block_x as u32)
    }
}

/// Gray room with a two-tone box in the middle, a red goal marker on its face, and
/// the patrolling block in front of it.
fn synthetic_frame(block_x: u32) -> Option<Frame> {
    Frame::from_fn(SCENE_WIDTH, SCENE_HEIGHT, |x, y| {
        if (block_x..block_x + BLOCK_WIDTH).contains(&x) && y >= SCENE_HEIGHT / 3 {
            Pixel::WHITE
        } else if (70..80).contains(&x) && (50..70).contains(&y) {
            Pixel::rgb(210, 30, 30)
        } else if (50..75).contains(&x) {
            Pixel::gray(210)
        } else if (75..110).contains(&x) {
            Pixel::gray(20)
        } else {
            Pixel::gray(90)
        }
    })
    .ok()
}

/// Raw reading rises as the robot closes in during the second half of each cycle.
fn front_left(tick: u64) -> f64 {
    let phase = tick % APPROACH_PERIOD;
    if phase < APPROACH_PERIOD / 2 {
        0.0
    } else {
        (phase - APPROACH_PERIOD / 2) as f64 * 1.5
    }
}

fn front_right(tick: u64) -> f64 {
    front_left(tick) * 0.8
}

async fn drive<C: Camera>(camera: C, args: &RunArgs) -> Result<()> {
    let keyboard = ScriptedKeyboard::from_codes(
        KEY_SCRIPT
            .iter()
            .flat_map(|&(code, ticks)| std::iter::repeat_n(code, ticks)),
    );

    let machine = BehaviorStateMachine::new(
        BehaviorConfig::default(),
        VisionPipeline::new(PipelineConfig::default()),
    );
    let sensors = [
        ScriptedProximity::new(front_left as fn(u64) -> f64),
        ScriptedProximity::new(front_right as fn(u64) -> f64),
    ];
    let mut controller = Controller::new(
        camera,
        sensors,
        RecordingMotors::default(),
        keyboard,
        machine,
    );

    if let Some(dir) = &args.snapshot_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
    }

    let mut stepper = FixedSteps::new(args.ticks);
    let mut interval = tokio::time::interval(args.timestep);
    let mut tick = 0u64;

    while stepper.step() {
        interval.tick().await;
        let report = controller.tick();

        let analyzed = report
            .outcome
            .as_ref()
            .is_some_and(|outcome| outcome.analysis.is_some());
        if let (true, Some(dir), Some(frame)) =
            (analyzed, &args.snapshot_dir, controller.frames().previous())
        {
            let path = dir.join(format!("analysis_{tick:05}.png"));
            image_helper::save(&path, frame)
                .with_context(|| format!("writing snapshot {}", path.display()))?;
        }
        tick += 1;
    }

    log::info!(
        "Run complete: {} ticks, {} drive commands, final state {}",
        tick,
        controller.motors().commands.len(),
        controller.machine().state()
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args = RunArgs::parse()?;
    match &args.frames_dir {
        Some(dir) => {
            let camera = PlaybackCamera::from_dir(dir)
                .with_context(|| format!("loading frames from {}", dir.display()))?;
            drive(camera, &args).await
        }
        None => {
            let mut scene = PatrolScene::new();
            let camera =
                ScriptedCamera::new(SCENE_WIDTH, SCENE_HEIGHT, move |_| scene.render());
            drive(camera, &args).await
        }
    }
}
