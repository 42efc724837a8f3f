use clap::Parser;
use simse_tagrec_engine::config::CliArgs;
use simse_tagrec_engine::engine::StatsHandle;
use simse_tagrec_engine::error::TagRecError;
use simse_tagrec_engine::loader;
use simse_tagrec_engine::server::TagRecServer;
use simse_tagrec_engine::transport::NdjsonTransport;

fn main() {
	let args = CliArgs::parse();

	// Logs go to stderr; stdout carries protocol messages or query output.
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	if let Err(e) = run(args) {
		tracing::error!("Fatal: {}", e);
		std::process::exit(1);
	}
}

fn run(args: CliArgs) -> Result<(), TagRecError> {
	let config = args.server_config();
	let stats = StatsHandle::new();

	if let Some(path) = &args.data {
		let report = loader::load_path(path, config.malformed)?;
		let summary = stats.load(&report);
		tracing::info!(
			annotations = summary.annotations,
			users = summary.users,
			items = summary.items,
			tags = summary.tags,
			"Statistics ready"
		);
	}

	if let Some(user) = &args.user {
		let recs = stats.recommend(user, args.k, &config.scoring);
		let items: Vec<&str> = recs.iter().map(|r| r.item.as_str()).collect();
		println!("{}", items.join(&args.separator));
		return Ok(());
	}

	let transport = NdjsonTransport::new();
	let mut server = TagRecServer::new(transport, config, stats);

	tracing::info!("simse-tagrec-engine ready");
	server.run()
}
