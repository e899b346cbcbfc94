use hexapod_robot::gait::GaitKind;
use hexapod_robot::robot::joint::JointAngles;
use hexapod_robot::robot::servo::ServoBatch;
use hexapod_robot::{ControlInput, LegActuator, LegIndex, Mover, RobotConfig};

const DT: f32 = 0.02;

#[derive(Default)]
struct BatchLog {
    open: bool,
    batches: usize,
    writes_in_batch: usize,
    max_writes: usize,
    durations: Vec<u32>,
}

impl LegActuator for BatchLog {
    fn begin_batch(&mut self) {
        assert!(!self.open, "nested batch");
        self.open = true;
        self.writes_in_batch = 0;
    }

    fn write_leg(&mut self, _leg: LegIndex, _angles: JointAngles) {
        assert!(self.open, "write outside a batch");
        self.writes_in_batch += 1;
    }

    fn commit_batch(&mut self, duration_ms: u32) {
        assert!(self.open, "commit without begin");
        self.open = false;
        self.batches += 1;
        self.max_writes = self.max_writes.max(self.writes_in_batch);
        self.durations.push(duration_ms);
    }
}

fn collapse(gaits: &mut Vec<GaitKind>, gait: GaitKind) {
    if gaits.last() != Some(&gait) {
        gaits.push(gait);
    }
}

#[test]
fn walk_then_stop() {
    let mut mover = Mover::new(&RobotConfig::new());
    let mut log = BatchLog::default();
    let mut gaits = Vec::new();
    let mut last_time = mover.time();

    mover.set_control(&ControlInput::new(0.0, 0.0, 1.0, 0.0));
    for _ in 0..150 {
        let report = mover.update(DT, &mut log);
        assert!(report.time > last_time);
        last_time = report.time;
        collapse(&mut gaits, report.gait);
    }

    mover.set_control(&ControlInput::default());
    for _ in 0..300 {
        let report = mover.update(DT, &mut log);
        assert!(report.time >= last_time);
        last_time = report.time;
        collapse(&mut gaits, report.gait);
    }

    assert_eq!(
        gaits,
        vec![
            GaitKind::Mixer,
            GaitKind::Tripod,
            GaitKind::Mixer,
            GaitKind::Idle
        ]
    );
    assert_eq!(log.batches, 450);
    assert!(log.max_writes <= 6);
    assert!(log.durations.iter().all(|&d| d == 20));
}

#[test]
fn servo_batch_collects_tick_frames() {
    let mut mover = Mover::new(&RobotConfig::new());
    let mut batch = ServoBatch::new([JointAngles::default(); 6]);

    mover.enable_locomotion(true, &mut batch);
    let centred = batch.take_frame().expect("centring commits a frame");
    assert_eq!(centred.duration_ms, 200);
    assert_eq!(centred.angles, [JointAngles::new(90, 90, 90); 6]);

    mover.set_control(&ControlInput::new(0.0, 0.3, 0.0, 0.0));
    for _ in 0..50 {
        mover.update(DT, &mut batch);
        let frame = batch.take_frame().expect("every tick commits a frame");
        assert_eq!(frame.duration_ms, 20);
    }
    assert_ne!(mover.gait(), GaitKind::Idle);
}
