use std::{future::IntoFuture, process, sync::Arc};

use mdexport::{
    application::{
        error::AppError,
        export::ExportService,
        pdf::{WkhtmltopdfOptions, WkhtmltopdfRenderer},
        render::{RenderPipelineConfig, configure_render_service, render_service},
    },
    config,
    domain::documents::UploadedDocument,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;
    configure_render_service(RenderPipelineConfig::from(&settings.render))
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Convert(args) => run_convert(settings, args).await,
    }
}

fn build_export_service(settings: &config::Settings) -> Arc<ExportService> {
    let pdf = WkhtmltopdfRenderer::new(WkhtmltopdfOptions::from(&settings.pdf));
    Arc::new(ExportService::new(render_service(), Arc::new(pdf)))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = HttpState::new(
        build_export_service(&settings),
        settings.uploads.max_request_bytes.get(),
    );
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "mdexport::serve",
        addr = %settings.server.addr,
        upload_limit_mib = settings.uploads.limit_mib(),
        pdf_engine = %settings.pdf.engine_path.display(),
        "Listening for uploads"
    );

    let (signal_tx, signal_rx) = oneshot::channel();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(());
        })
        .into_future();
    let mut server = tokio::spawn(server);

    tokio::select! {
        joined = &mut server => return flatten_server_result(joined),
        Ok(()) = signal_rx => {}
    }

    info!(
        target = "mdexport::serve",
        grace_secs = settings.server.graceful_shutdown.as_secs(),
        "Shutdown requested; draining in-flight requests"
    );

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            warn!(
                target = "mdexport::serve",
                "Graceful shutdown timed out; aborting remaining connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "mdexport::serve", error = %err, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(target = "mdexport::serve", error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

async fn run_convert(settings: config::Settings, args: config::ConvertArgs) -> Result<(), AppError> {
    let config::ConvertArgs {
        input,
        format,
        output,
        ..
    } = args;

    let bytes = tokio::fs::read(&input)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let document = UploadedDocument::new(filename, bytes);

    let export = build_export_service(&settings);
    let artifact = tokio::task::spawn_blocking(move || export.export(&document, format))
        .await
        .map_err(|err| AppError::unexpected(format!("conversion task failed: {err}")))??;

    let destination = output.unwrap_or_else(|| input.with_file_name(&artifact.filename));
    tokio::fs::write(&destination, &artifact.bytes)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "mdexport::convert",
        input = %input.display(),
        output = %destination.display(),
        format = %format,
        bytes = artifact.bytes.len(),
        "Conversion written"
    );
    Ok(())
}
