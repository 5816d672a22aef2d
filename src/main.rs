use clap::Parser;
use thoughtboard::cli::{handle_init, handle_list, handle_post, handle_serve, Cli, Commands};
use thoughtboard::logging::{init_logging, Verbosity};

fn main() {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.quiet, cli.verbose));

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            database,
            dev,
        } => handle_serve(config, host, port, database, dev),
        Commands::Init { database } => handle_init(config, database),
        Commands::Post {
            board_id,
            content,
            database,
            json,
        } => handle_post(config, board_id, content, database, json),
        Commands::List {
            board_id,
            database,
            json,
        } => handle_list(config, board_id, database, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
