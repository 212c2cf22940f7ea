//! The scan orchestrator implementation.

use crate::audit::{self, Counter, NoopCounters, ScanCounters};
use crate::classifier::{classify, ReplyVerdict};
use crate::config::GatewayConfig;
use crate::core::{
    ArcEngine, EngineClient, Fingerprinter, ScanError, ScanRequest, ScanStage, ScanVerdict,
};
use crate::magic::{self, LazyWhitelist, SignatureSet};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Where the orchestrator gets its signature set from.
#[derive(Debug, Clone)]
enum WhitelistSource {
    /// The process-wide set from [`magic::global`].
    Global,
    /// A lazily loaded set shared with other components.
    Lazy(Arc<LazyWhitelist>),
    /// A set built up front.
    Fixed(Arc<SignatureSet>),
}

/// Builder for creating a `ScanOrchestrator`.
pub struct ScanOrchestratorBuilder {
    engine: Option<ArcEngine>,
    whitelist: WhitelistSource,
    counters: Arc<dyn ScanCounters>,
    fingerprinter: Fingerprinter,
}

impl ScanOrchestratorBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            engine: None,
            whitelist: WhitelistSource::Global,
            counters: Arc::new(NoopCounters),
            fingerprinter: Fingerprinter::new(),
        }
    }

    /// Sets the engine non-whitelisted content is delegated to.
    pub fn engine<E: EngineClient + 'static>(mut self, engine: E) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Sets an engine wrapped in an Arc.
    pub fn arc_engine(mut self, engine: ArcEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Uses a pre-built signature set instead of the process-wide one.
    pub fn with_signatures(mut self, signatures: impl Into<Arc<SignatureSet>>) -> Self {
        self.whitelist = WhitelistSource::Fixed(signatures.into());
        self
    }

    /// Uses a lazily loaded whitelist, built on the first request.
    pub fn with_lazy_whitelist(mut self, whitelist: Arc<LazyWhitelist>) -> Self {
        self.whitelist = WhitelistSource::Lazy(whitelist);
        self
    }

    /// Loads the whitelist from `path` on the first request.
    pub fn with_whitelist_path(self, path: impl Into<PathBuf>) -> Self {
        self.with_lazy_whitelist(Arc::new(LazyWhitelist::new(path)))
    }

    /// Applies the gateway configuration: the whitelist is loaded from
    /// `config.whitelist.path`.
    pub fn with_config(self, config: &GatewayConfig) -> Self {
        self.with_whitelist_path(config.whitelist.path.clone())
    }

    /// Sets the counter sink.
    pub fn with_counters(mut self, counters: Arc<dyn ScanCounters>) -> Self {
        self.counters = counters;
        self
    }

    /// Builds the orchestrator.
    pub fn build(self) -> Result<ScanOrchestrator, ScanError> {
        let engine = self
            .engine
            .ok_or_else(|| ScanError::configuration("an engine client is required"))?;

        Ok(ScanOrchestrator {
            engine,
            whitelist: self.whitelist,
            counters: self.counters,
            fingerprinter: self.fingerprinter,
        })
    }
}

impl Default for ScanOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs each scan request through fingerprinting, the whitelist check,
/// and (unless whitelisted) the engine.
///
/// The orchestrator holds no per-request state; one instance serves any
/// number of concurrent requests.
pub struct ScanOrchestrator {
    engine: ArcEngine,
    whitelist: WhitelistSource,
    counters: Arc<dyn ScanCounters>,
    fingerprinter: Fingerprinter,
}

impl ScanOrchestrator {
    /// Creates a new builder.
    pub fn builder() -> ScanOrchestratorBuilder {
        ScanOrchestratorBuilder::new()
    }

    /// Produces the verdict for one request.
    ///
    /// # Errors
    ///
    /// - `EmptyFile` / `MissingParameter` before any processing.
    /// - `SizeLimitExceeded` or an engine I/O error if delegation fails;
    ///   no verdict is produced in that case.
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanVerdict, ScanError> {
        self.counters.increment(Counter::ScanCall);
        request.validate()?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "scan",
            request_id = %request_id,
            filename = %request.filename(),
            filesize = request.size(),
            sha256 = tracing::field::Empty,
        );

        self.run(&request_id, request).instrument(span).await
    }

    async fn run(&self, request_id: &str, request: &ScanRequest) -> Result<ScanVerdict, ScanError> {
        enter(ScanStage::Received);

        let fingerprint = self.fingerprinter.fingerprint(request.data());
        tracing::Span::current().record("sha256", fingerprint.sha256.as_str());
        enter(ScanStage::Fingerprinted);
        audit::emit_scan_received(request_id, request.filename(), &fingerprint);

        let whitelist = self.whitelist();
        let trusted = whitelist.find_match(request.data());
        enter(ScanStage::WhitelistChecked);

        if let Some(signature) = trusted {
            enter(ScanStage::ShortCircuited);
            self.counters.increment(Counter::Blacklisted);
            audit::emit_short_circuit(request_id, &fingerprint, signature);

            let verdict = ScanVerdict::skipped(request.filename(), fingerprint);
            enter(ScanStage::Completed);
            audit::emit_verdict(request_id, &verdict);
            return Ok(verdict);
        }

        enter(ScanStage::Delegated);
        let started = Instant::now();
        let reply = match self.engine.scan(request.data()).await {
            Ok(reply) => reply,
            Err(e) => {
                audit::emit_scan_failed(request_id, &e);
                return Err(e);
            }
        };
        let duration_millis = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let raw_reply = String::from_utf8_lossy(&reply).into_owned();
        let ReplyVerdict {
            infected,
            signature_name,
        } = classify(&raw_reply);
        enter(ScanStage::Classified);

        if infected {
            self.counters.increment(Counter::Infected);
        }

        let verdict = ScanVerdict::scanned(
            infected,
            raw_reply,
            signature_name,
            request.filename(),
            fingerprint,
            duration_millis,
        );
        enter(ScanStage::Completed);
        audit::emit_verdict(request_id, &verdict);

        Ok(verdict)
    }

    /// Probes the engine.
    ///
    /// Returns `"Clamd responding: <engine reply>"`.
    pub async fn ping(&self) -> Result<String, ScanError> {
        let status = self.engine.ping().await?;
        tracing::info!(engine = self.engine.name(), status = %status, "Clamd response");
        Ok(format!("Clamd responding: {}", status))
    }

    /// Returns the engine.
    pub fn engine(&self) -> &ArcEngine {
        &self.engine
    }

    /// Returns the signature set, loading it if this is the first use.
    pub fn whitelist(&self) -> Arc<SignatureSet> {
        match &self.whitelist {
            WhitelistSource::Global => magic::global(),
            WhitelistSource::Lazy(lazy) => lazy.get(),
            WhitelistSource::Fixed(set) => Arc::clone(set),
        }
    }
}

fn enter(stage: ScanStage) {
    tracing::debug!(stage = %stage, "Scan stage");
}

impl std::fmt::Debug for ScanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOrchestrator")
            .field("engine", &self.engine.name())
            .field("whitelist", &self.whitelist)
            .field("counters", &self.counters)
            .finish()
    }
}
