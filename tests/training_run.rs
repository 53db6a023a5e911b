use std::path::Path;
use std::sync::{mpsc, Arc};

use boardnet::data::{DataLoader, Sample, VecDataset};
use boardnet::network::{Model, Network, NetworkSpec, NetworkState};
use boardnet::optim::{AdamW, OneCycle, OneCyclePolicy};
use boardnet::task::MarginMatch;
use boardnet::train::{Phase, SessionParts, TrainEvent, TrainingSession};
use boardnet::{LoopConfig, MseLoss, RunConfig, TaskKind, TrainError};

fn side_data(n: usize) -> VecDataset {
    // Bright left half means target 0, bright right half means target 1.
    VecDataset::new(
        (0..n)
            .map(|i| {
                let flipped = i % 3 == 0;
                let input = if flipped { vec![0.0, 0.1, 0.9, 1.0] } else { vec![1.0, 0.9, 0.1, 0.0] };
                Sample::new(input, vec![if flipped { 1.0 } else { 0.0 }])
            })
            .collect(),
    )
}

fn gray_images(dir: &Path, names: &[String]) {
    std::fs::create_dir_all(dir).unwrap();
    for (i, name) in names.iter().enumerate() {
        let shade = (i * 37 % 256) as u8;
        let img = image::GrayImage::from_fn(12, 12, |x, y| image::Luma([shade.wrapping_add((x * 8 + y) as u8)]));
        img.save(dir.join(name)).unwrap();
    }
}

#[test]
fn session_learns_side_and_ends_on_budget() {
    let total = 150;
    let model = Network::from_spec(&NetworkSpec::mlp("side", 4, &[(6, 0.0)], 1), 11).unwrap();
    let schedule = OneCycle::new(AdamW::new(0.0), OneCyclePolicy::new(0.02, total, 0.3)).unwrap();
    let (tx, rx) = mpsc::channel();

    let session = TrainingSession::new(SessionParts {
        model,
        criterion: Box::new(MseLoss),
        correctness: Box::new(MarginMatch::default()),
        schedule,
        // 7 full batches per pass; the 30th sample is dropped.
        train_loader: DataLoader::new(Arc::new(side_data(30)), 4, true, true, 5),
        test_loader: DataLoader::new(Arc::new(side_data(12)), 4, false, true, 0),
        config: LoopConfig::new(total, 7, 7).with_progress(tx),
    });
    assert_eq!(session.phase(), Phase::Warming);

    let outcome = session.run().unwrap();
    assert_eq!(outcome.steps, total);

    let best = outcome.best.expect("at least one evaluation ran");
    assert_eq!(best.accuracy, 1.0);

    // Restoring the best state reproduces its accuracy.
    let mut restored = Network::from_spec(&NetworkSpec::mlp("side", 4, &[(6, 0.0)], 1), 0).unwrap();
    restored.restore(&best.state).unwrap();
    let correct = side_data(12).samples().iter()
        .filter(|s| (restored.infer(&s.input)[0] - s.target[0]).abs() < 0.5)
        .count();
    assert_eq!(correct, 12);

    let events: Vec<TrainEvent> = rx.try_iter().collect();
    let last_eval = events.iter().rev().find_map(|e| match e {
        TrainEvent::Evaluation(r) => Some(r.step),
        _ => None,
    });
    assert_eq!(last_eval, Some(total));
    // 21 passes of 7 batches is 147 steps; the final 3 steps force one more evaluation.
    assert_eq!(outcome.history.len(), 22);
}

#[test]
fn board_pipeline_writes_checkpoint_and_plot() {
    let dir = tempfile::tempdir().unwrap();
    let pool = dir.path().join("fen_images");
    let placements = [
        "rnbqkbnr-pppppppp-8-8-8-8-PPPPPPPP-RNBQKBNR",
        "8-8-8-4k3-8-8-8-4K3",
        "r3k2r-8-8-8-8-8-8-R3K2R",
        "8-8-8-8-8-8-8-8",
    ];
    let names: Vec<String> = (0..16).map(|i| format!("{}_{:02}.png", placements[i % 4], i)).collect();
    gray_images(&pool, &names);

    let mut config = RunConfig::for_task(TaskKind::Board);
    config.train_source = pool;
    config.outdir = dir.path().join("models");
    config.total_steps = 20;
    config.batch_size = 2;
    config.loss_report_every = 5;
    config.eval_every = 10;
    config.train_test_split = 0.75;
    config.image_width = 8;
    config.image_height = 8;

    let paths = boardnet::execute(&config).unwrap();
    assert!(paths.checkpoint.starts_with(&config.outdir));
    assert!(paths.checkpoint.exists());
    assert!(paths.plot.exists());

    let name = paths.checkpoint.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("best_model_fen_"));
    assert_eq!(
        paths.plot.file_name().unwrap().to_str().unwrap(),
        format!("{}.png", name)
    );

    let state = NetworkState::load_json(&paths.checkpoint).unwrap();
    let mut net = Network::from_spec(&TaskKind::Board.default_spec(64), 1).unwrap();
    net.restore(&state).unwrap();
}

#[test]
fn orientation_pipeline_caps_test_set_from_train_size() {
    let dir = tempfile::tempdir().unwrap();
    let train_dir = dir.path().join("train");
    let test_dir = dir.path().join("test");
    let names: Vec<String> = (0..20).map(|i| format!("board_{:03}.png", i)).collect();
    gray_images(&train_dir, &names);
    gray_images(&test_dir, &names);

    let mut config = RunConfig::for_task(TaskKind::Orientation);
    config.train_source = train_dir;
    config.test_source = Some(test_dir);
    config.outdir = dir.path().join("out");
    config.total_steps = 12;
    config.batch_size = 2;
    config.loss_report_every = 4;
    config.eval_every = 5;
    config.image_width = 6;
    config.image_height = 6;

    let (tx, rx) = mpsc::channel();
    let paths = boardnet::pipeline::execute_with_progress(&config, Some(tx)).unwrap();
    assert!(paths.checkpoint.exists());

    // floor(20 * 0.3) = 6 test images, so every evaluation covers 6 samples.
    let evals: Vec<_> = rx.try_iter()
        .filter_map(|e| match e {
            TrainEvent::Evaluation(r) => Some(r),
            _ => None,
        })
        .collect();
    assert!(!evals.is_empty());
    assert!(evals.iter().all(|r| r.evaluation.samples == 6));
    assert_eq!(evals.last().unwrap().step, 12);
}

#[test]
fn run_shorter_than_a_pass_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    let names: Vec<String> = (0..40).map(|i| format!("8-8-8-8-8-8-8-8_{:02}.png", i)).collect();
    let pool = dir.path().join("pool");
    gray_images(&pool, &names);

    let mut config = RunConfig::for_task(TaskKind::Board);
    config.train_source = pool;
    config.outdir = dir.path().join("models");
    config.total_steps = 3;
    config.batch_size = 2;
    config.loss_report_every = 3;
    config.eval_every = 3;
    config.train_test_split = 0.9;
    config.image_width = 4;
    config.image_height = 4;

    // Only the forced final evaluation runs, which still yields a snapshot.
    let paths = boardnet::execute(&config).unwrap();
    assert!(paths.checkpoint.exists());
}

#[test]
fn empty_source_fails_before_training() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty");
    std::fs::create_dir_all(&empty).unwrap();

    let mut config = RunConfig::for_task(TaskKind::Board);
    config.train_source = empty;
    config.outdir = dir.path().join("models");
    assert!(matches!(boardnet::execute(&config), Err(TrainError::Dataset(_))));
    assert!(!config.outdir.exists());
}
