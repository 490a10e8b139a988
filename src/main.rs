use anyhow::Context;
use std::io::{self, BufRead, Write};

use otk_wolf::logging;
use otk_wolf::meta_info::MetaInfo;
use otk_wolf::packet::{Packet, Request, respond};
use otk_wolf::role_assign::RoleAssignPlayer;
use otk_wolf::settings::Settings;

// Answers one JSON packet per stdin line until the server closes the stream.
fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("reading ./data/settings.json")?;
    if let Err(e) = logging::init(settings.log_dir.clone(), settings.level_filter()) {
        eprintln!("logging disabled: {e}");
    }

    let meta = MetaInfo::load_or_default(&settings.meta_path)
        .with_context(|| format!("reading {}", settings.meta_path.display()))?;
    let mut player = RoleAssignPlayer::new(
        settings.player_name.clone(),
        settings.player_config(),
        meta,
    );
    log::info!("{} is ready", player.name());

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("reading from the server")?;
        if line.trim().is_empty() {
            continue;
        }
        let packet: Packet = match serde_json::from_str(&line) {
            Ok(packet) => packet,
            Err(e) => {
                log::warn!("unreadable packet: {e}");
                continue;
            }
        };

        match respond(&mut player, &packet) {
            Ok(Some(answer)) => {
                writeln!(stdout, "{answer}")?;
                stdout.flush()?;
            }
            Ok(None) => {}
            Err(e) => log::error!("{} failed: {e}", packet.request),
        }

        if packet.request == Request::Finish {
            player
                .meta()
                .save_to_file(&settings.meta_path)
                .context("saving meta info")?;
        }
    }

    log::info!("server closed the connection");
    Ok(())
}
