use std::fs;

use robot_pilot::{load_pilot_config_from_env, PILOT_CONFIG_ENV};
use robot_runtime::Position;
use robot_sim::config::ACTOR_CONFIG_ENV;
use robot_sim::load_actor_config_from_env;
use serde_json::json;

// Both processes read their own file; they must agree on the arena and the start.
#[test]
fn configs_load_from_env_paths() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("robot_config_env_{}", std::process::id()));
    fs::create_dir_all(&dir)?;

    let actor_path = dir.join("actor.json");
    fs::write(
        &actor_path,
        serde_json::to_string_pretty(&json!({
            "listen_addr": "127.0.0.1:3024",
            "fps": 30,
            "arena": { "width": 640, "height": 480 },
            "spawn": { "x": 320, "y": 400 }
        }))?,
    )?;
    let pilot_path = dir.join("pilot.json");
    fs::write(
        &pilot_path,
        serde_json::to_string_pretty(&json!({
            "server_port": 3024,
            "arena_width": 640,
            "arena_height": 480,
            "start": { "x": 320, "y": 400 }
        }))?,
    )?;

    std::env::set_var(ACTOR_CONFIG_ENV, &actor_path);
    std::env::set_var(PILOT_CONFIG_ENV, &pilot_path);
    let (actor, source) = load_actor_config_from_env();
    let pilot = load_pilot_config_from_env();
    std::env::remove_var(ACTOR_CONFIG_ENV);
    std::env::remove_var(PILOT_CONFIG_ENV);

    assert_eq!(source.as_deref(), Some(actor_path.as_path()));
    assert_eq!(actor.fps, 30);
    assert_eq!(actor.listen_addr.port(), pilot.server_port);
    assert_eq!(actor.arena, pilot.arena());
    assert_eq!(actor.spawn_point(), Position::new(320, 400));
    assert_eq!(pilot.start_position(), actor.spawn_point());

    // A path that cannot be read falls back to the builtin config.
    std::env::set_var(ACTOR_CONFIG_ENV, dir.join("missing.json"));
    let (fallback, source) = load_actor_config_from_env();
    std::env::remove_var(ACTOR_CONFIG_ENV);
    assert!(source.is_none());
    assert_eq!(fallback.listen_addr.port(), 2024);
    assert_eq!(fallback.fps, 60);

    fs::remove_dir_all(&dir)?;
    Ok(())
}
