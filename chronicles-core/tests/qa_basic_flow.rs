//! QA tests for basic game flow using the headless API.
//!
//! These tests drive the line protocol the way the command-line front end
//! does, with scripted dice so every fight is predictable.
//!
//! Run with: `cargo test -p chronicles-core --test qa_basic_flow`

use chronicles_core::testing::assert_invariants;
use chronicles_core::{
    Catalog, Character, CharacterClass, GameSession, HeadlessGame, ScriptedDice, SessionConfig,
};
use tempfile::TempDir;

fn game_for(character: Character, config: SessionConfig) -> HeadlessGame<ScriptedDice> {
    let session = GameSession::with_parts(
        character,
        Catalog::default_items(),
        ScriptedDice::new(),
        config,
    );
    HeadlessGame::from_session(session)
}

fn warrior_game() -> HeadlessGame<ScriptedDice> {
    game_for(
        Character::new("Thorin", CharacterClass::Warrior),
        SessionConfig::new(),
    )
}

// =============================================================================
// State queries
// =============================================================================

#[test]
fn test_banner_shows_status() {
    let mut game = warrior_game();
    let banner = game.banner();

    assert_eq!(banner[0], "=== Quest Chronicles ===");
    assert!(banner.contains(&"[STATUS]".to_string()));
    assert!(banner.contains(&"  Character: Thorin (Warrior)".to_string()));
    assert!(banner.contains(&"  Health: 120/120".to_string()));
    assert!(banner.contains(&"  Gold: 100".to_string()));
    assert_eq!(banner.last().unwrap(), "Type #help for commands.");
}

#[test]
fn test_banner_revives_character_saved_dead() {
    let mut hero = Character::new("Thorin", CharacterClass::Warrior);
    hero.health = 0;
    let mut game = game_for(hero, SessionConfig::new());

    let banner = game.banner();
    assert!(banner
        .iter()
        .any(|l| l == "[DEFEAT] You were defeated. Paid 50 gold to revive with 60 health."));
    assert_eq!(game.session().character().gold, 50);
    assert_eq!(game.session().character().health, 60);
}

#[tokio::test]
async fn test_status_and_help() {
    let mut game = warrior_game();

    let status = game.execute("#status").await;
    assert_eq!(status.lines[0], "[STATUS]");
    assert!(status.lines.contains(&"  Ability: Power Strike".to_string()));
    assert!(!status.quit);

    let help = game.execute("help").await;
    assert_eq!(help.lines[0], "[HELP]");
    assert!(help.lines.iter().any(|l| l.contains("#explore")));

    assert_eq!(game.command_count(), 2);
}

#[tokio::test]
async fn test_bad_commands_report_errors() {
    let mut game = warrior_game();

    let reply = game.execute("#dance").await;
    assert_eq!(
        reply.lines,
        vec!["[ERROR] Unknown command '#dance'. Type #help for help."]
    );

    let reply = game.execute("#buy").await;
    assert_eq!(reply.lines, vec!["[ERROR] Usage: #buy <item_id>"]);

    let reply = game.execute("#attack").await;
    assert!(reply.lines[0].starts_with("[ERROR]"));
    assert!(!reply.quit);
}

// =============================================================================
// Shopping and items
// =============================================================================

#[tokio::test]
async fn test_shop_flow() {
    let mut game = warrior_game();

    let shop = game.execute("#shop").await;
    assert_eq!(shop.lines[0], "[SHOP] You have 100 gold.");
    assert!(shop.lines.iter().any(|l| l.contains("iron_sword")));

    let reply = game.execute("#buy iron_sword").await;
    assert_eq!(
        reply.lines,
        vec!["[SHOP] Bought iron_sword for 50 gold. 50 gold left."]
    );

    let reply = game.execute("#equip iron_sword").await;
    assert_eq!(reply.lines, vec!["[ITEM] Equipped iron_sword."]);
    assert_eq!(game.session().character().strength, 20);

    let reply = game.execute("#buy expensive_item").await;
    assert!(reply.lines[0].starts_with("[ERROR]"));
    assert_eq!(game.session().character().gold, 50);

    let reply = game.execute("#unequip weapon").await;
    assert_eq!(reply.lines, vec!["[ITEM] Unequipped iron_sword."]);

    let reply = game.execute("#sell iron_sword").await;
    assert_eq!(
        reply.lines,
        vec!["[SHOP] Sold iron_sword for 25 gold. 75 gold now."]
    );

    let reply = game.execute("#unequip armor").await;
    assert_eq!(reply.lines, vec!["[ITEM] No armor equipped."]);
    assert_invariants(game.session().character());
}

#[tokio::test]
async fn test_use_potion() {
    let mut game = warrior_game();
    game.session_mut().character_mut().health = 50;

    game.execute("#buy health_potion").await;
    let reply = game.execute("#use health_potion").await;
    assert!(reply.lines[0].starts_with("[ITEM] Used health_potion"));
    assert_eq!(game.session().character().health, 70);
    assert!(game.session().character().inventory.is_empty());

    let reply = game.execute("#use health_potion").await;
    assert!(reply.lines[0].starts_with("[ERROR]"));
}

// =============================================================================
// Combat
// =============================================================================

#[tokio::test]
async fn test_interactive_fight_to_victory() {
    let mut game = warrior_game();

    let reply = game.execute("#fight").await;
    assert_eq!(reply.lines[0], "[COMBAT] A level 1 Goblin appears! (50 health)");

    // Only one fight at a time
    let reply = game.execute("#explore").await;
    assert!(reply.lines[0].starts_with("[ERROR]"));

    // 13 damage a round against the goblin, 5 back
    for _ in 0..3 {
        let reply = game.execute("#attack").await;
        assert!(reply.lines.last().unwrap().starts_with("[COMBAT] You:"));
    }
    let reply = game.execute("#attack").await;
    assert!(reply
        .lines
        .contains(&"[VICTORY] Gained 25 experience and 10 gold.".to_string()));

    let hero = game.session().character();
    assert_eq!(hero.health, 105);
    assert_eq!(hero.gold, 110);
    assert_eq!(hero.experience, 25);
    assert!(!game.session().in_combat());
}

#[tokio::test]
async fn test_explore_levels_up() {
    let mut game = warrior_game();
    game.session_mut().character_mut().experience = 90;

    let reply = game.execute("#explore").await;
    assert_eq!(reply.lines[0], "[COMBAT] A level 1 Goblin appears!");
    assert!(reply
        .lines
        .contains(&"[LEVEL UP] You are now level 2!".to_string()));

    let hero = game.session().character();
    assert_eq!(hero.level, 2);
    assert_eq!(hero.experience, 15);
    // Level-up restores full health
    assert_eq!(hero.health, hero.max_health);
}

#[tokio::test]
async fn test_escape_with_scripted_coin() {
    let mut hero = Character::new("Thorin", CharacterClass::Warrior);
    hero.level = 6;
    let session = GameSession::with_parts(
        hero,
        Catalog::default_items(),
        ScriptedDice::from_flips([false, true]),
        SessionConfig::new(),
    );
    let mut game = HeadlessGame::from_session(session);

    let reply = game.execute("#fight").await;
    assert_eq!(reply.lines[0], "[COMBAT] A level 6 Dragon appears! (200 health)");

    let reply = game.execute("#run").await;
    assert_eq!(reply.lines[0], "[COMBAT] You failed to escape!");
    assert_eq!(game.session().character().health, 98);
    assert!(game.session().in_combat());

    let reply = game.execute("#escape").await;
    assert_eq!(
        reply.lines,
        vec!["[COMBAT] You escaped!", "[COMBAT] The fight is over."]
    );
    assert!(!game.session().in_combat());
    assert_eq!(game.session().character().experience, 0);
}

#[tokio::test]
async fn test_defeat_without_gold_ends_game() {
    let mut hero = Character::new("Elara", CharacterClass::Mage);
    hero.health = 1;
    hero.gold = 10;
    let mut game = game_for(hero, SessionConfig::new());

    let reply = game.execute("#explore").await;
    assert!(reply
        .lines
        .contains(&"[GAME OVER] You were defeated and cannot afford to revive.".to_string()));
    assert!(reply.quit);
    assert!(game.session().is_over());

    let reply = game.execute("#buy health_potion").await;
    assert!(reply.lines[0].starts_with("[ERROR] Game over"));
    assert!(reply.quit);
}

// =============================================================================
// Saving and quitting
// =============================================================================

#[tokio::test]
async fn test_save_and_quit() {
    let dir = TempDir::new().unwrap();
    let mut game = game_for(
        Character::new("Thorin", CharacterClass::Warrior),
        SessionConfig::new().with_save_dir(dir.path()),
    );

    let reply = game.execute("#save").await;
    assert!(reply.lines[0].starts_with("[SAVED]"));
    assert!(dir.path().join("Thorin.json").exists());

    let reply = game.execute("#quit").await;
    assert_eq!(reply.lines, vec!["Goodbye!"]);
    assert!(reply.quit);
}
