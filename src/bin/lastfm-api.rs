use clap::{Parser, Subcommand};
use lastfm_api::{ClientConfig, LastFmApi, LastFmClient, Track, TrackRef, WireFormat};

/// Query the Last.fm web-service API
#[derive(Parser)]
#[command(name = "lastfm-api", about = "Query the Last.fm web-service API", long_about = None)]
struct Cli {
    /// Last.fm API key
    #[arg(long, env = "LASTFM_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Wire format to request from Last.fm (json or xml)
    #[arg(long, global = true, default_value = "json")]
    format: WireFormat,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a user's recently played tracks
    Recent {
        user: String,
        #[arg(short, long)]
        limit: Option<u32>,
        /// Output template, e.g. "{artist} - {title} ({album})"
        #[arg(short, long, default_value = "{title} by {artist}")]
        template: String,
    },
    /// Show metadata for a track
    Track {
        /// Artist name (requires --title)
        #[arg(long, requires = "title", conflicts_with = "mbid")]
        artist: Option<String>,
        /// Track title (requires --artist)
        #[arg(long, requires = "artist")]
        title: Option<String>,
        /// MusicBrainz recording id
        #[arg(long)]
        mbid: Option<String>,
        /// Include this user's play data
        #[arg(long)]
        user: Option<String>,
    },
    /// Show a user's profile and whether they are listening right now
    User {
        user: String,
        #[arg(short, long, default_value_t = 1)]
        limit: u32,
    },
    /// Show a tag with its top tracks and artists
    Tag {
        tag: String,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_module("lastfm_api", log::LevelFilter::Debug);
    }
    logger.init();

    let config = ClientConfig::new(args.api_key.clone()).with_format(args.format);
    let client = LastFmClient::new(Box::new(http_client::native::NativeClient::new()), config);

    if let Err(e) = run(&client, args.command, args.json).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(
    client: &LastFmClient,
    command: Commands,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Recent {
            user,
            limit,
            template,
        } => {
            let tracks = client.get_tracks(&user, limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tracks)?);
                return Ok(());
            }
            for track in &tracks {
                let marker = if track.playing { "▶" } else { " " };
                println!("{marker} {}", track.format(&template, &[("user", user.as_str())])?);
            }
        }
        Commands::Track {
            artist,
            title,
            mbid,
            user,
        } => {
            let track_ref = match (mbid, artist, title) {
                (Some(mbid), _, _) => TrackRef::Mbid(mbid),
                (None, Some(artist), Some(title)) => TrackRef::from((artist, title)),
                _ => return Err("either --mbid or both --artist and --title are required".into()),
            };
            let track = client.get_track(track_ref, user).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&track)?);
            } else {
                print_track_details(&track);
            }
        }
        Commands::User { user, limit } => {
            let profile = client.get_user(&user, Some(limit)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
                return Ok(());
            }
            println!("{}", profile.username);
            if let Some(count) = profile.listen_count {
                println!("  scrobbles:  {count}");
            }
            if let Some(registered) = profile.birthday {
                println!("  registered: {}", registered.format("%Y-%m-%d"));
            }
            match profile.current_track() {
                Some(track) => println!("  now playing: {track}"),
                None => println!("  not listening right now"),
            }
        }
        Commands::Tag { tag, limit } => {
            let tag = client.get_tag(&tag, Some(limit)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tag)?);
                return Ok(());
            }
            println!("{}", tag.name);
            if let Some(url) = &tag.url {
                println!("  {url}");
            }
            if let (Some(reach), Some(taggings)) = (tag.reach, tag.taggings) {
                println!("  reach {reach}, taggings {taggings}");
            }
            for (i, track) in tag.top_tracks.iter().flatten().enumerate() {
                println!("  {:>2}. {track}", i + 1);
            }
            if let Some(artists) = &tag.top_artists {
                println!("  artists: {}", artists.join(", "));
            }
        }
    }
    Ok(())
}

fn print_track_details(track: &Track) {
    println!("{track}");
    for (name, value) in track.fields() {
        if name != "title" && name != "artist" {
            println!("  {name}: {value}");
        }
    }
}
