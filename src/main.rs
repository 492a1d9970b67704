use clap::Parser;
use sku_image_etl::core::report;
use sku_image_etl::domain::ports::Pipeline;
use sku_image_etl::utils::{logger, validation::Validate};
use sku_image_etl::{
    CliConfig, CloudinaryUploader, Credentials, DeliveryUrlBuilder, EnrichPipeline, EtlEngine,
    EtlError, HttpImageFetcher, LocalStorage,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!("❌ Run aborted: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }
}

async fn run(cli: &CliConfig) -> Result<(), EtlError> {
    // Nothing is read or requested until the account is known.
    let credentials = Credentials::from_env()?;
    tracing::debug!("Credentials: {:?}", credentials);

    let settings = cli.resolve()?;
    settings.validate()?;
    tracing::debug!("Settings: {:?}", settings);

    let fetcher = HttpImageFetcher::new(settings.fetch_timeout)?;
    let delivery = DeliveryUrlBuilder::new(
        &settings.delivery_base_url,
        &credentials.cloud_name,
        &settings.transform,
    );
    let uploader = CloudinaryUploader::new(
        credentials,
        &settings.api_base_url,
        settings.folder.clone(),
        settings.upload_timeout,
    )?;
    let pipeline = EnrichPipeline::new(
        LocalStorage::current_dir(),
        fetcher,
        uploader,
        delivery,
        settings,
    );

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched, uploaded or written");
        let sheet = pipeline.extract().await?;
        for planned in pipeline.plan(&sheet) {
            match planned.public_id {
                Ok(id) => println!("Row {} {} → {}", planned.sheet_row, planned.sku, id),
                Err(reason) => println!("Row {} {} – skipping", planned.sheet_row, reason),
            }
        }
        return Ok(());
    }

    let engine = EtlEngine::new(pipeline);
    let run_report = engine.run().await?;

    println!("{}", report::output_line(&run_report.output_path));
    Ok(())
}
