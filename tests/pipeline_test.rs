use lakehouse_utils::audit::record::{DATA_SOURCE, NOTEBOOK, TARGET_OBJECT, TARGET_SCHEMA, WRITE_MODE};
use lakehouse_utils::audit::{
    audit_table, run_notebook, AuditRecorder, JobConfig, PipelineRunContext, RunOutcome,
};
use lakehouse_utils::delta::TableWriter;
use lakehouse_utils::error::{LakehouseError, Result};
use lakehouse_utils::pipeline::{
    ARCHIVE_FOLDER, FILE_PATTERN, SIGN_COLUMNS, SOURCE_FOLDER,
};
use lakehouse_utils::platform::{
    CredentialProvider, LocalFileSystem, NotebookRunner, TokenScope,
};
use lakehouse_utils::{
    ExecutionContext, IngestionPipeline, PathResolver, StorageTarget, TableAddress,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct MountedToken;

impl CredentialProvider for MountedToken {
    fn token(&self, _scope: TokenScope) -> Result<String> {
        Ok(String::new())
    }
}

/// Child notebook that always blows up
struct BrokenNotebook;

#[async_trait]
impl NotebookRunner for BrokenNotebook {
    async fn run(
        &self,
        notebook: &str,
        _timeout: Duration,
        _params: &HashMap<String, String>,
    ) -> anyhow::Result<String> {
        anyhow::bail!("notebook {} raised KeyError: 'AMOUNT'", notebook)
    }
}

fn context() -> ExecutionContext {
    ExecutionContext::new("finance-ws", "bronze", "etl@corp", "master_loader", true)
}

fn writer(root: &TempDir) -> Arc<TableWriter> {
    let resolver = PathResolver::new(context())
        .with_mount_root(root.path().join("lakehouse"))
        .with_target(StorageTarget::Mounted);
    Arc::new(TableWriter::new(resolver, Arc::new(MountedToken)))
}

fn run_context() -> PipelineRunContext {
    PipelineRunContext {
        run_id: "8c1f7e0a".to_string(),
        trigger_time: "2024-04-01 09:00:00".to_string(),
        pipeline_name: "daily_gl".to_string(),
        trigger_type: "ScheduleTrigger".to_string(),
    }
}

fn job(landing: &str, archive: &str) -> JobConfig {
    JobConfig::from_iter([
        (DATA_SOURCE, "sap"),
        (NOTEBOOK, "load_gl"),
        (TARGET_SCHEMA, "raw"),
        (TARGET_OBJECT, "gl_lines"),
        (WRITE_MODE, "overwrite"),
        (SOURCE_FOLDER, landing),
        (FILE_PATTERN, "gl_"),
        (ARCHIVE_FOLDER, archive),
        (SIGN_COLUMNS, "amount"),
    ])
}

#[tokio::test]
async fn test_pipeline_loads_audits_and_archives_each_file() {
    let root = TempDir::new().unwrap();
    let landing = root.path().join("landing");
    let archive = root.path().join("archive");
    fs::create_dir_all(&landing).unwrap();

    fs::write(landing.join("gl_2024_01.csv"), "account,amount\n4000,286.64-\n4010,12.00\n").unwrap();
    fs::write(landing.join("gl_2024_02.csv"), "account,amount\n4000,5.50\n").unwrap();
    fs::write(landing.join("readme.txt"), "not data").unwrap();
    fs::write(landing.join("vendors.csv"), "id\n1\n").unwrap();

    let writer = writer(&root);
    let pipeline = IngestionPipeline::new(Arc::new(LocalFileSystem::new()), writer.clone());
    let job = job(landing.to_str().unwrap(), archive.to_str().unwrap());

    let reports = pipeline.run(&job, &run_context()).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.outcome == RunOutcome::Success));
    assert_eq!(reports.iter().map(|r| r.rows).sum::<usize>(), 3);

    // second file appends to the table the first one replaced
    let target = TableAddress::new("raw", "gl_lines");
    assert_eq!(writer.row_count(&target).await.unwrap(), 3);
    assert_eq!(writer.row_count(&audit_table()).await.unwrap(), 2);

    assert!(archive.join("gl_2024_01.csv").is_file());
    assert!(archive.join("gl_2024_02.csv").is_file());
    assert!(!landing.join("gl_2024_01.csv").exists());
    assert!(landing.join("vendors.csv").is_file());
    assert_eq!(
        reports[0].archived_to.as_deref(),
        Some(archive.join("gl_2024_01.csv").to_str().unwrap())
    );
}

#[tokio::test]
async fn test_unreadable_file_is_audited_as_failure_and_kept() {
    let root = TempDir::new().unwrap();
    let landing = root.path().join("landing");
    let archive = root.path().join("archive");
    fs::create_dir_all(&landing).unwrap();
    fs::write(landing.join("gl_broken.xlsx"), "this is not a workbook").unwrap();

    let writer = writer(&root);
    let pipeline = IngestionPipeline::new(Arc::new(LocalFileSystem::new()), writer.clone());
    let reports = pipeline
        .run(&job(landing.to_str().unwrap(), archive.to_str().unwrap()), &run_context())
        .await
        .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, RunOutcome::Failure);
    assert!(reports[0].archived_to.is_none());
    assert!(landing.join("gl_broken.xlsx").is_file());
    assert_eq!(writer.row_count(&audit_table()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_bad_write_mode_aborts_before_any_file() {
    let root = TempDir::new().unwrap();
    let landing = root.path().join("landing");
    fs::create_dir_all(&landing).unwrap();
    fs::write(landing.join("gl_1.csv"), "a\n1\n").unwrap();

    let pipeline = IngestionPipeline::new(Arc::new(LocalFileSystem::new()), writer(&root));
    let job = job(landing.to_str().unwrap(), "archive").with(WRITE_MODE, "merge");

    let err = pipeline.run(&job, &run_context()).await.unwrap_err();
    assert!(matches!(err, LakehouseError::InvalidWriteMode(_)));
    assert!(landing.join("gl_1.csv").is_file());
}

#[tokio::test]
async fn test_failing_notebook_is_audited_as_failure() {
    let root = TempDir::new().unwrap();
    let writer = writer(&root);
    let recorder = AuditRecorder::new(writer.clone());
    let job = job("Files/landing", "Files/archive");

    let run = run_notebook(&BrokenNotebook, &job, &HashMap::new()).await.unwrap();
    assert_eq!(run.outcome, RunOutcome::Failure);
    assert_eq!(run.exit_value, "notebook load_gl raised KeyError: 'AMOUNT'");

    let record = recorder
        .audit_run(&job, "Files/landing/gl_1.csv", &run_context(), &run.exit_value, run.outcome)
        .await
        .unwrap();

    assert_eq!(record.outcome, RunOutcome::Failure);
    assert_eq!(record.executed_by, "etl@corp");
    assert!(record.is_pipeline_triggered);
    assert_eq!(writer.row_count(&audit_table()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_overwrite_waits_for_first_successful_file() {
    let root = TempDir::new().unwrap();
    let landing = root.path().join("landing");
    let archive = root.path().join("archive");
    fs::create_dir_all(&landing).unwrap();

    let writer = writer(&root);
    let pipeline = IngestionPipeline::new(Arc::new(LocalFileSystem::new()), writer.clone());
    let job = job(landing.to_str().unwrap(), archive.to_str().unwrap());
    let target = TableAddress::new("raw", "gl_lines");

    let mut seed = String::from("account,amount\n");
    for i in 0..100 {
        seed.push_str(&format!("{},{}.00\n", 5000 + i, i));
    }
    fs::write(landing.join("gl_0_seed.csv"), seed).unwrap();
    pipeline.run(&job, &run_context()).await.unwrap();
    assert_eq!(writer.row_count(&target).await.unwrap(), 100);

    fs::write(landing.join("gl_a_broken.xlsx"), "this is not a workbook").unwrap();
    fs::write(landing.join("gl_b.csv"), "account,amount\n4000,1.00-\n4010,2.00\n").unwrap();
    let reports = pipeline.run(&job, &run_context()).await.unwrap();

    let outcomes: Vec<RunOutcome> = reports.iter().map(|r| r.outcome).collect();
    assert_eq!(outcomes, vec![RunOutcome::Failure, RunOutcome::Success]);
    assert_eq!(writer.row_count(&target).await.unwrap(), 2);
}

#[tokio::test]
async fn test_missing_audit_key_aborts_before_any_write() {
    let root = TempDir::new().unwrap();
    let landing = root.path().join("landing");
    fs::create_dir_all(&landing).unwrap();
    fs::write(landing.join("gl_1.csv"), "account,amount\n4000,1.00\n").unwrap();

    let writer = writer(&root);
    let pipeline = IngestionPipeline::new(Arc::new(LocalFileSystem::new()), writer.clone());
    let job: JobConfig = job(landing.to_str().unwrap(), "archive")
        .as_map()
        .iter()
        .filter(|(k, _)| k.as_str() != DATA_SOURCE)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let err = pipeline.run(&job, &run_context()).await.unwrap_err();
    assert!(matches!(err, LakehouseError::MissingConfigKey(k) if k == DATA_SOURCE));

    assert!(writer.row_count(&TableAddress::new("raw", "gl_lines")).await.is_err());
    assert!(writer.row_count(&audit_table()).await.is_err());
    assert!(landing.join("gl_1.csv").is_file());
}
