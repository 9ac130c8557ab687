//! Integration tests for the orchestrator: concurrency, failure isolation,
//! and timeout behavior with stand-in similarity providers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use revigo_jobs::{
    AnnotationSet, Aspect, Error, GoTerm, GoTermId, InformationContentSimilarity, JobEvent,
    JobRequest, JobStatus, Ontology, Orchestrator, OrchestratorConfig, Result, SimilarityMeasure,
    SimilarityProvider, SimilarityResult, SpeciesAnnotations,
};

const TABLE: &str = "GO:0006281 1e-6\nGO:0006302 1e-4\nGO:0006869 0.01\nGO:0005739 0.001\n";

fn term(id: u32, name: &str, aspect: Aspect, parents: &[u32]) -> GoTerm {
    GoTerm {
        id: GoTermId(id),
        name: name.to_string(),
        aspect,
        obsolete: false,
        parents: parents.iter().map(|p| GoTermId(*p)).collect(),
        alt_ids: Vec::new(),
    }
}

fn snapshots() -> (Arc<Ontology>, Arc<AnnotationSet>) {
    let ontology = Ontology::from_terms(vec![
        term(8150, "biological_process", Aspect::BiologicalProcess, &[]),
        term(6281, "DNA repair", Aspect::BiologicalProcess, &[8150]),
        term(6302, "double-strand break repair", Aspect::BiologicalProcess, &[6281]),
        term(6869, "lipid transport", Aspect::BiologicalProcess, &[8150]),
        term(5575, "cellular_component", Aspect::CellularComponent, &[]),
        term(5739, "mitochondrion", Aspect::CellularComponent, &[5575]),
    ])
    .unwrap();
    let annotations = AnnotationSet::new(vec![SpeciesAnnotations {
        taxon: 9606,
        name: "Homo sapiens".to_string(),
        counts: HashMap::from([
            (GoTermId(8150), 1000),
            (GoTermId(6281), 60),
            (GoTermId(6302), 50),
            (GoTermId(6869), 40),
            (GoTermId(5575), 900),
            (GoTermId(5739), 300),
        ]),
    }]);
    (Arc::new(ontology), Arc::new(annotations))
}

/// Delegates to the default provider after blocking for `delay`.
struct SlowProvider {
    delay: Duration,
}

impl SimilarityProvider for SlowProvider {
    fn compute(
        &self,
        ontology: &Ontology,
        annotations: &SpeciesAnnotations,
        aspect: Aspect,
        terms: &[GoTermId],
        measure: SimilarityMeasure,
    ) -> Result<SimilarityResult> {
        std::thread::sleep(self.delay);
        InformationContentSimilarity.compute(ontology, annotations, aspect, terms, measure)
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Rejects every cellular-component request.
struct NoCellularComponent;

impl SimilarityProvider for NoCellularComponent {
    fn compute(
        &self,
        ontology: &Ontology,
        annotations: &SpeciesAnnotations,
        aspect: Aspect,
        terms: &[GoTermId],
        measure: SimilarityMeasure,
    ) -> Result<SimilarityResult> {
        if aspect == Aspect::CellularComponent {
            return Err(Error::UnsupportedMeasure { measure, aspect });
        }
        InformationContentSimilarity.compute(ontology, annotations, aspect, terms, measure)
    }

    fn name(&self) -> &str {
        "no_cc"
    }
}

#[tokio::test]
async fn test_single_job_finishes_with_results() {
    let (ontology, annotations) = snapshots();
    let orchestrator = Orchestrator::new(OrchestratorConfig::default(), ontology, annotations);

    let completion = orchestrator
        .submit(JobRequest::new(1, TABLE).with_cutoff(0.4))
        .wait()
        .await;

    assert_eq!(completion.status, JobStatus::Finished);
    assert!(completion.error.is_none());
    let results = completion.results.expect("results");
    assert!(results.complete);
    assert_eq!(results.job_id, 1);
    assert_eq!(results.term_count(), 4);
    let bp = results.aspect(Aspect::BiologicalProcess).unwrap();
    assert_eq!(
        bp.properties(GoTermId(6302)).unwrap().representative,
        Some(GoTermId(6281))
    );
}

#[tokio::test]
async fn test_many_jobs_complete_independently() {
    let (ontology, annotations) = snapshots();
    let orchestrator = Orchestrator::new(
        OrchestratorConfig::default().with_max_concurrent(2),
        ontology,
        annotations,
    );

    let handles: Vec<_> = (1..=6)
        .map(|id| orchestrator.submit(JobRequest::new(id, TABLE).with_cutoff(0.1 * id as f64)))
        .collect();
    let completions = join_all(handles.into_iter().map(|h| h.wait())).await;

    assert_eq!(completions.len(), 6);
    for (i, completion) in completions.iter().enumerate() {
        assert_eq!(completion.job_id, i as u32 + 1);
        assert_eq!(completion.status, JobStatus::Finished);
        let results = completion.results.as_ref().unwrap();
        assert!((results.cutoff - 0.1 * (i + 1) as f64).abs() < 1e-12);
    }
}

#[tokio::test]
async fn test_failing_job_does_not_affect_sibling() {
    let (ontology, annotations) = snapshots();
    let orchestrator = Orchestrator::new(OrchestratorConfig::default(), ontology, annotations)
        .with_similarity_provider(NoCellularComponent);

    let failing = orchestrator.submit(JobRequest::new(1, TABLE));
    let healthy = orchestrator.submit(JobRequest::new(2, "GO:0006281 1e-6\nGO:0006869 0.01\n"));

    let failing = failing.wait().await;
    let healthy = healthy.wait().await;

    assert_eq!(failing.status, JobStatus::Failed);
    assert!(failing.results.is_none());
    assert!(failing.error.unwrap().contains("unsupported"));

    assert_eq!(healthy.status, JobStatus::Finished);
    assert_eq!(healthy.results.unwrap().term_count(), 2);
}

#[tokio::test]
async fn test_invalid_table_fails_job() {
    let (ontology, annotations) = snapshots();
    let orchestrator = Orchestrator::new(OrchestratorConfig::default(), ontology, annotations);

    let completion = orchestrator
        .submit(JobRequest::new(9, "GO:0006281 not-a-number\n"))
        .wait()
        .await;

    assert_eq!(completion.status, JobStatus::Failed);
    assert!(completion.error.unwrap().contains("line 1"));
}

#[tokio::test]
async fn test_deadline_yields_partial_results() {
    let (ontology, annotations) = snapshots();
    let orchestrator = Orchestrator::new(
        OrchestratorConfig::default().with_timeout_grace(Duration::from_secs(10)),
        ontology,
        annotations,
    )
    .with_similarity_provider(SlowProvider {
        delay: Duration::from_millis(150),
    });

    let completion = orchestrator
        .submit(JobRequest::new(5, TABLE).with_timeout(Duration::from_millis(50)))
        .wait()
        .await;

    assert_eq!(completion.status, JobStatus::TimedOut);
    let results = completion.results.expect("partial results");
    assert!(!results.complete);
    // Every submitted term is still present and render-safe
    assert_eq!(results.term_count(), 4);
    assert!(results.enrichments.is_empty());
}

#[tokio::test]
async fn test_unresponsive_job_is_abandoned() {
    let (ontology, annotations) = snapshots();
    let orchestrator = Orchestrator::new(
        OrchestratorConfig::default().with_timeout_grace(Duration::from_millis(20)),
        ontology,
        annotations,
    )
    .with_similarity_provider(SlowProvider {
        delay: Duration::from_millis(500),
    });

    let completion = orchestrator
        .submit(JobRequest::new(6, TABLE).with_timeout(Duration::from_millis(20)))
        .wait()
        .await;

    assert_eq!(completion.status, JobStatus::TimedOut);
    assert!(completion.results.is_none());
    assert!(completion.error.is_some());
    assert!(completion.elapsed < Duration::from_millis(500));
}

#[tokio::test]
async fn test_status_polling_reaches_terminal_state() {
    let (ontology, annotations) = snapshots();
    let orchestrator = Orchestrator::new(OrchestratorConfig::default(), ontology, annotations);

    let mut handle = orchestrator.submit(JobRequest::new(3, TABLE));
    let completion = loop {
        if let Some(completion) = handle.try_completion() {
            break completion;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    };

    assert_eq!(completion.status, JobStatus::Finished);
    // The completion is delivered once only
    assert!(handle.try_completion().is_none());
}

#[tokio::test]
async fn test_events_report_lifecycle() {
    let (ontology, annotations) = snapshots();
    let orchestrator = Orchestrator::new(OrchestratorConfig::default(), ontology, annotations);
    let mut events = orchestrator.events();

    orchestrator.submit(JobRequest::new(11, TABLE)).wait().await;

    let mut started = false;
    let mut progressed = false;
    let mut completed = false;
    while let Ok(event) = events.try_recv() {
        match event {
            JobEvent::JobStarted { job_id } => started = job_id == 11,
            JobEvent::JobProgress { job_id, .. } => progressed |= job_id == 11,
            JobEvent::JobCompleted { job_id, status, .. } => {
                completed = job_id == 11 && status == JobStatus::Finished
            }
            JobEvent::JobFailed { .. } => panic!("unexpected failure"),
        }
    }
    assert!(started && progressed && completed);
}
