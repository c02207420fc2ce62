//! QA tests for quests: the protocol commands, rewards and saved progress.
//!
//! Run with: `cargo test -p chronicles-core --test qa_quests`

use chronicles_core::testing::assert_invariants;
use chronicles_core::{
    Catalog, Character, CharacterClass, GameSession, HeadlessGame, QuestDataError, QuestError,
    QuestLog, ScriptedDice, SessionConfig, SessionError,
};
use tempfile::TempDir;

fn game_for(character: Character) -> HeadlessGame<ScriptedDice> {
    let session = GameSession::with_parts(
        character,
        Catalog::default_items(),
        ScriptedDice::new(),
        SessionConfig::new(),
    );
    HeadlessGame::from_session(session)
}

fn warrior() -> Character {
    Character::new("Thorin", CharacterClass::Warrior)
}

// =============================================================================
// Protocol
// =============================================================================

#[tokio::test]
async fn test_quest_listing() {
    let mut game = game_for(warrior());

    let reply = game.execute("#quests").await;
    assert_eq!(
        reply.lines,
        vec![
            "[QUEST] 0/4 completed (0%)".to_string(),
            "  available: first_steps - First Steps (25 xp, 15 gold)".to_string(),
        ]
    );

    game.execute("#accept first_steps").await;
    let reply = game.execute("#quests").await;
    assert!(reply.lines.contains(&"  active: first_steps - First Steps".to_string()));
    assert!(!reply.lines.iter().any(|l| l.starts_with("  available:")));
}

#[tokio::test]
async fn test_accept_and_complete() {
    let mut game = game_for(warrior());

    let reply = game.execute("#accept first_steps").await;
    assert_eq!(
        reply.lines,
        vec!["[QUEST] Accepted First Steps: Complete your first adventure".to_string()]
    );

    let reply = game.execute("#complete first_steps").await;
    assert_eq!(
        reply.lines,
        vec!["[QUEST] Completed first_steps! Gained 25 experience and 15 gold.".to_string()]
    );

    let hero = game.session().character();
    assert_eq!(hero.experience, 25);
    assert_eq!(hero.gold, 115);
    assert_eq!(hero.completed_quests, vec!["first_steps"]);
    assert!(hero.active_quests.is_empty());

    let reply = game.execute("#quests").await;
    assert_eq!(reply.lines[0], "[QUEST] 1/4 completed (25%)");
    assert!(reply
        .lines
        .contains(&"  available: goblin_menace - Goblin Menace (50 xp, 25 gold)".to_string()));
}

#[tokio::test]
async fn test_quest_reward_levels_up() {
    let mut hero = warrior();
    hero.experience = 90;
    hero.health = 40;
    let mut game = game_for(hero);

    game.execute("#accept first_steps").await;
    let reply = game.execute("#complete first_steps").await;
    assert_eq!(reply.lines[1], "[LEVEL UP] You are now level 2!");

    let hero = game.session().character();
    assert_eq!((hero.level, hero.experience), (2, 15));
    assert_eq!(hero.health, 130);
    assert_invariants(hero);
}

#[tokio::test]
async fn test_quest_errors() {
    let mut game = game_for(warrior());

    let reply = game.execute("#accept").await;
    assert_eq!(reply.lines, vec!["[ERROR] Usage: #accept <quest_id>".to_string()]);

    let reply = game.execute("#accept lost_cat").await;
    assert_eq!(reply.lines, vec!["[ERROR] Quest 'lost_cat' not found".to_string()]);

    let reply = game.execute("#accept goblin_menace").await;
    assert_eq!(
        reply.lines,
        vec!["[ERROR] Quest 'goblin_menace' requires completing 'first_steps' first".to_string()]
    );

    let reply = game.execute("#accept orc_warband").await;
    assert_eq!(
        reply.lines,
        vec!["[ERROR] Quest 'orc_warband' requires level 3 (you are level 1)".to_string()]
    );

    let reply = game.execute("#complete first_steps").await;
    assert_eq!(
        reply.lines,
        vec!["[ERROR] Quest 'first_steps' is not active".to_string()]
    );

    game.execute("#accept first_steps").await;
    let reply = game.execute("#accept first_steps").await;
    assert_eq!(
        reply.lines,
        vec!["[ERROR] Quest 'first_steps' already active".to_string()]
    );

    let reply = game.execute("#abandon first_steps").await;
    assert_eq!(reply.lines, vec!["[QUEST] Abandoned first_steps.".to_string()]);
    assert!(game.session().character().active_quests.is_empty());
}

#[tokio::test]
async fn test_dead_character_cannot_complete() {
    let mut game = game_for(warrior());
    game.execute("#accept first_steps").await;
    game.session_mut().character_mut().health = 0;

    let reply = game.execute("#complete first_steps").await;
    assert_eq!(reply.lines, vec!["[ERROR] Thorin is dead".to_string()]);
    assert!(game.session().character().is_quest_active("first_steps"));
    assert_eq!(game.session().character().gold, 100);
}

// =============================================================================
// Data files and saves
// =============================================================================

#[tokio::test]
async fn test_quest_progress_survives_save() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = SessionConfig::new().with_save_dir(temp_dir.path());

    let mut session = GameSession::new(warrior(), config.clone()).await.unwrap();
    session.accept_quest("first_steps").unwrap();
    session.complete_quest("first_steps").unwrap();
    session.accept_quest("goblin_menace").unwrap();
    session.save().await.unwrap();

    let loaded = GameSession::load("Thorin", config).await.unwrap();
    let hero = loaded.character();
    assert_eq!(hero.completed_quests, vec!["first_steps"]);
    assert_eq!(hero.active_quests, vec!["goblin_menace"]);
    assert_eq!(
        loaded.quests().total_rewards_earned(hero).gold,
        15
    );
}

#[tokio::test]
async fn test_session_uses_quest_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("quests.txt");
    std::fs::write(
        &path,
        "QUEST_ID: rat_cellar\n\
         TITLE: Rats in the Cellar\n\
         DESCRIPTION: Clear out the tavern cellar\n\
         REWARD_XP: 10\n\
         REWARD_GOLD: 5\n\
         REQUIRED_LEVEL: 1\n\
         PREREQUISITE: NONE\n",
    )
    .unwrap();
    let config = SessionConfig::new()
        .with_save_dir(temp_dir.path())
        .with_quests_path(&path);

    let mut session = GameSession::new(warrior(), config).await.unwrap();
    assert_eq!(session.quests().len(), 1);
    assert!(matches!(
        session.accept_quest("first_steps"),
        Err(SessionError::Quest(QuestError::NotFound(_)))
    ));
    session.accept_quest("rat_cellar").unwrap();
    assert_eq!(session.complete_quest("rat_cellar").unwrap().gold, 5);
}

#[tokio::test]
async fn test_bad_quest_file_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("quests.txt");
    std::fs::write(&path, "QUEST_ID: broken\nTITLE: Broken\n").unwrap();

    assert!(matches!(
        QuestLog::load(&path).await,
        Err(QuestDataError::InvalidFormat { block: 1, .. })
    ));
    let config = SessionConfig::new().with_quests_path(&path);
    assert!(matches!(
        GameSession::new(warrior(), config).await,
        Err(SessionError::QuestData(_))
    ));
    assert!(matches!(
        QuestLog::load(temp_dir.path().join("missing.txt")).await,
        Err(QuestDataError::MissingFile(_))
    ));
}
