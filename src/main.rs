use std::{
    fs::File,
    io::{self, Result},
    path::{Path, PathBuf},
    sync::Arc,
};

use acquire_engine::{
    logic::{
        game_options::{GameOptions, SeatConfig},
        player::{BotKind, PlayerId},
    },
    room::{spawn_room, GameSession, RoomError},
    visuals::{
        tui,
        tui_app::{Seat, TuiApp},
    },
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, structopt::StructOpt)]
struct Opt {
    /// the number of players
    #[structopt(short = "-p", long, default_value = "3")]
    players: usize,

    /// How many of the players sit at this terminal. The rest are bots.
    #[structopt(long, default_value = "1")]
    humans: usize,

    /// Strategy for the bot seats: random or passive.
    #[structopt(short = "-b", long, default_value = "random")]
    bot: BotKind,

    /// Seed for the tile bag and the bots.
    #[structopt(short = "-s", long)]
    seed: Option<u64>,

    /// Starting cash per player.
    #[structopt(long, default_value = "6000")]
    cash: u32,

    /// The width of each cell.
    #[structopt(short = "-w", long, default_value = "6")]
    cell_width: u16,

    /// The height of each cell.
    #[structopt(short = "-H", long, default_value = "3")]
    cell_height: u16,

    /// Where to write the log, the terminal belongs to the game.
    #[structopt(long, parse(from_os_str), default_value = "acquire.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> Result<()> {
    let log_file = File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("acquire_engine=info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn game_options(opt: &Opt) -> GameOptions {
    let seats = (0..opt.players)
        .map(|i| match i < opt.humans {
            true => SeatConfig::human(&format!("Player {}", i + 1)),
            false => SeatConfig::bot(&format!("Bot {}", i + 1), opt.bot),
        })
        .collect();

    let options = GameOptions::builder()
        .seats(seats)
        .starting_cash(opt.cash);
    match opt.seed {
        Some(seed) => options.seed(seed).build(),
        None => options.build(),
    }
}

fn invalid_input(error: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, error)
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    init_logging(&opt.log_file)?;

    let options = game_options(&opt);
    let session = GameSession::new(&options).map_err(invalid_input)?;
    info!(players = opt.players, humans = opt.humans, "starting");

    let runtime = tokio::runtime::Runtime::new()?;
    let (room, task) = {
        let _guard = runtime.enter();
        spawn_room(session)
    };

    let humans = opt.humans.min(opt.players);
    let seats = runtime
        .block_on(async {
            let mut seats = Vec::new();
            for id in (0..humans).map(PlayerId) {
                seats.push(Seat::new(id, room.connect(id).await?));
            }
            Ok::<_, RoomError>(seats)
        })
        .map_err(invalid_input)?;

    let app_result = match seats.is_empty() {
        // nobody to show a board to, the bots have already played it out
        true => Ok(()),
        false => {
            let mut terminal = tui::init()?;
            let mut tui_app = TuiApp::builder()
                .cell_width(opt.cell_width)
                .cell_height(opt.cell_height)
                .room(room.clone())
                .runtime(runtime.handle().clone())
                .seats(seats)
                .build();

            let app_result = tui_app.run(&mut terminal);
            tui::restore()?;
            app_result
        }
    };

    let session = runtime
        .block_on(async {
            room.shutdown().await?;
            task.await.map_err(|_| RoomError::Closed)
        })
        .map_err(invalid_input)?;

    if let Some(scores) = session.game().final_scores() {
        for score in scores {
            println!(
                "{}. {} ${}{}",
                score.rank,
                score.name,
                score.total,
                if score.winner { " (winner)" } else { "" }
            );
        }
    }
    info!(version = session.version(), "done");

    app_result
}
