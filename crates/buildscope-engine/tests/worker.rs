//! Channel ingestion tests
//!
//! Several producer threads feed one reconstruction worker.

use anyhow::Result;
use buildscope_engine::{ReconstructOptions, ReconstructionWorker};
use buildscope_testing::EventStreamBuilder;
use buildscope_testing::assertions::*;
use buildscope_types::*;
use std::thread;

#[test]
fn test_many_producers_one_writer() -> Result<()> {
    let worker = ReconstructionWorker::spawn(ReconstructOptions::default())?;

    for record in EventStreamBuilder::new()
        .build_started()
        .project_started(1, "App.csproj")
        .build()
    {
        worker.send(record)?;
    }

    let producers: Vec<_> = (0..4)
        .map(|n| {
            let tx = worker.sender();
            thread::spawn(move || {
                let records = EventStreamBuilder::new()
                    .message(EventContext::project(1), &format!("worker {}", n))
                    .message(EventContext::project(1), &format!("worker {}", n))
                    .message(EventContext::project(1), &format!("worker {}", n))
                    .build();
                for record in records {
                    tx.send(record).expect("worker is running");
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().expect("producer thread panicked");
    }

    let tree = worker.finish()?;
    assert_tree_integrity(&tree)?;

    let project = find_unique(&tree, "App.csproj")?;
    assert_eq!(diagnostics_under(&tree, project).len(), 12);
    Ok(())
}

#[test]
fn test_worker_reports_strict_failures() -> Result<()> {
    let options = ReconstructOptions::default()
        .with_unknown_data_behavior(UnknownDataBehavior::ThrowException);
    let worker = ReconstructionWorker::spawn(options)?;

    for record in EventStreamBuilder::new()
        .build_started()
        .unknown_record("77")
        .build_finished(true)
        .build()
    {
        // Sends after the failure may find the channel closed
        let _ = worker.send(record);
    }

    let err = worker.finish().unwrap_err();
    assert!(matches!(err, Error::UnknownData { .. }));
    Ok(())
}
