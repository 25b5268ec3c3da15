use std::time::Duration;

use broadside::prelude::*;
use rand::seq::SliceRandom;

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A simulated player that fires at every cell once, in random order.
struct Gunner {
    player_id: PlayerId,
    targets: Vec<(u8, u8)>,
    lifeline: Option<Lifeline>,
}

impl Gunner {
    fn new(player_id: PlayerId, size: u8, lifeline: Lifeline) -> Self {
        let mut targets: Vec<(u8, u8)> = (0..size)
            .flat_map(|x| (0..size).map(move |y| (x, y)))
            .collect();
        targets.shuffle(&mut rand::rng());
        Self {
            player_id,
            targets,
            lifeline: Some(lifeline),
        }
    }

    /// Builds the wire request for the next shot, if any cell is left.
    fn next_shot(&mut self) -> Option<MatchRequest> {
        let (x, y) = self.targets.pop()?;
        Some(MatchRequest::PlayerShot {
            player_id: self.player_id,
            x,
            y,
        })
    }

    /// Drops the connection.
    fn disconnect(&mut self) {
        if let Some(lifeline) = self.lifeline.take() {
            lifeline.cut();
        }
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Reads settings from the JSON file named by `BROADSIDE_CONFIG`, if set.
fn load_config() -> Result<BroadsideConfig, Box<dyn std::error::Error>> {
    match std::env::var("BROADSIDE_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        Err(_) => Ok(BroadsideConfig::default()),
    }
}

async fn seat(
    directory: &MatchDirectory,
    match_id: MatchId,
    player_id: PlayerId,
    size: u8,
) -> Result<Gunner, BroadsideError> {
    let (lifeline, liveness) = Lifeline::new();
    let connection = ConnectionHandle::new(ConnectionId::new(player_id.0), liveness);
    directory.join(match_id, player_id, connection).await?;
    Ok(Gunner::new(player_id, size, lifeline))
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = load_config()?;
    let size = config.boards.size;
    let directory = Broadside::from_config(config);
    let codec = JsonCodec;

    let match_id = directory.create();
    tracing::info!(%match_id, "skirmish starting");

    let mut gunners = [
        seat(&directory, match_id, PlayerId(1), size).await?,
        seat(&directory, match_id, PlayerId(2), size).await?,
    ];

    // Players alternate until one fleet is gone or both run out of cells.
    let mut view = directory.get_data(match_id).await?;
    'battle: while !view.over {
        let mut fired = false;
        for gunner in gunners.iter_mut() {
            let Some(request) = gunner.next_shot() else {
                continue;
            };
            fired = true;
            let bytes = codec.encode(&request)?;
            let reply = serve_request(&directory, &codec, match_id, &bytes).await?;
            match codec.decode::<MatchReply>(&reply)? {
                MatchReply::Game(next) => view = next,
                MatchReply::Error { reason } => {
                    tracing::warn!(%match_id, %reason, "shot rejected");
                }
                MatchReply::Player(_) => {}
            }
            if view.over {
                break 'battle;
            }
        }
        if !fired {
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&view)?);
    match view.winner {
        Some(winner) => tracing::info!(%match_id, %winner, turns = view.turns.len(), "fleet sunk"),
        None => tracing::info!(%match_id, "no winner"),
    }

    // Dropping a connection tears the whole match down.
    gunners[0].disconnect();
    while directory.contains(match_id) {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    if let Err(gone) = directory.get_data(match_id).await {
        tracing::info!(%match_id, error = %gone, "match torn down");
    }
    Ok(())
}
