use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use account_relay::config::{Settings, TransportKind};
use account_relay::feed::LineFeed;
use account_relay::observability::{
    RejectionStats, StructuredLogger, Tracer, TracingLogger, TracingTracer,
};
use account_relay::pipeline::AccountChangePipeline;
use account_relay::publisher::{BusTransport, LineTransport, Publisher, Transport};
use account_relay::translator::Translator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new()?;

    // 初始化日志（输出到 stderr，stdout 留给传输层）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(settings.logging.filter.parse()?),
        )
        .init();

    info!("[Startup] account-relay initializing...");
    info!(
        "[Config] Publishing to '{}' via {:?}",
        settings.publisher.topic, settings.transport.kind
    );

    let logger: Arc<dyn StructuredLogger> = Arc::new(TracingLogger);
    let tracer: Arc<dyn Tracer> = Arc::new(TracingTracer);
    let stats = Arc::new(RejectionStats::new());

    // 传输层在启动阶段构造完成，之后以 Arc 交给发布器
    let transport: Arc<dyn Transport> = match settings.transport.kind {
        TransportKind::Stdout => Arc::new(LineTransport::stdout()),
        TransportKind::Bus => {
            let bus = Arc::new(BusTransport::new(settings.transport.bus_capacity));
            let mut rx = bus.subscribe("*").await;
            tokio::spawn(async move {
                while let Some(envelope) = rx.recv().await {
                    info!(
                        "[Bus] {} AccountId={} {:?}",
                        envelope.topic,
                        envelope.body.account_id(),
                        envelope.body.changed_blocks()
                    );
                }
            });
            bus
        }
    };

    let translator = Translator::new(
        logger.clone(),
        tracer.clone(),
        stats.clone(),
        settings.translator.json_limits(),
    );
    let publisher = Publisher::new(
        transport,
        logger.clone(),
        tracer,
        stats.clone(),
        settings.publisher.topic.clone(),
    );
    let pipeline = AccountChangePipeline::new(translator, publisher);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("[Shutdown] Interrupt received");
                cancel.cancel();
            }
        }
    });

    info!("[Startup] Reading payloads from stdin");
    let feed = LineFeed::new(settings.listener.max_line_bytes);
    let summary = feed.run(tokio::io::stdin(), &pipeline, &cancel).await;

    logger.info(
        "AccountRelay",
        "shutdown",
        &format!(
            "received {}, handed off {}, skipped {}, discarded {}",
            summary.received, summary.handed_off, summary.skipped, summary.discarded_lines
        ),
    );
    for (reason, count) in stats.snapshot() {
        logger.info("AccountRelay", "shutdown", &format!("{}: {}", reason, count));
    }

    Ok(())
}
