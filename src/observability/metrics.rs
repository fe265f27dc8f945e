use prometheus::{
    Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub deposits_total: IntCounterVec,
    pub points_awarded_total: IntCounterVec,
    pub deposit_latency_seconds: HistogramVec,
    pub bins_needing_attention: IntGauge,
    pub bin_capacity_percentage: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let deposits_total = IntCounterVec::new(
            Opts::new("deposits_total", "Total deposits by outcome"),
            &["outcome"],
        )
        .expect("valid deposits_total metric");

        let points_awarded_total = IntCounterVec::new(
            Opts::new("points_awarded_total", "EcoPoints awarded by waste type"),
            &["waste_type"],
        )
        .expect("valid points_awarded_total metric");

        let deposit_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "deposit_latency_seconds",
                "Latency of deposit processing in seconds",
            ),
            &["outcome"],
        )
        .expect("valid deposit_latency_seconds metric");

        let bins_needing_attention =
            IntGauge::new("bins_needing_attention", "Bins at or above the attention threshold")
                .expect("valid bins_needing_attention metric");

        let bin_capacity_percentage = GaugeVec::new(
            Opts::new("bin_capacity_percentage", "Bin fill level [0..100]"),
            &["bin_id"],
        )
        .expect("valid bin_capacity_percentage metric");

        registry
            .register(Box::new(deposits_total.clone()))
            .expect("register deposits_total");
        registry
            .register(Box::new(points_awarded_total.clone()))
            .expect("register points_awarded_total");
        registry
            .register(Box::new(deposit_latency_seconds.clone()))
            .expect("register deposit_latency_seconds");
        registry
            .register(Box::new(bins_needing_attention.clone()))
            .expect("register bins_needing_attention");
        registry
            .register(Box::new(bin_capacity_percentage.clone()))
            .expect("register bin_capacity_percentage");

        Self {
            registry,
            deposits_total,
            points_awarded_total,
            deposit_latency_seconds,
            bins_needing_attention,
            bin_capacity_percentage,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
