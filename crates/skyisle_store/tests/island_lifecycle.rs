use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement, TransactionTrait};
use skyisle_store::{
    connect, Capability, Denial, Island, IslandId, IslandStore, IsleConfig, IsleError,
    IsleResult, Rank, UserId,
};
use tempfile::tempdir;

fn config(base: &Path) -> IsleConfig {
    let mut config = IsleConfig::default_sqlite(base.join("isle.db").to_string_lossy());
    config.rules.invite_ttl_ms = Some(60_000);
    config
}

async fn open(base: &Path) -> IsleResult<IslandStore> {
    IslandStore::connect(&config(base), base).await
}

async fn run_sql(conn: &DatabaseConnection, sql: &str) {
    conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
        .await
        .expect(sql);
}

async fn drop_table(store: &IslandStore, table: &str) {
    run_sql(store.connection(), &format!("DROP TABLE {table}")).await;
}

#[tokio::test]
async fn register_island_rereads_backend_id() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;

    let first = store.register_island("Atoll").await?;
    let second = store.register_island("Reef").await?;
    assert_eq!(first.id, IslandId(1));
    assert_eq!(second.id, IslandId(2));
    assert_eq!(store.island_by_name("Reef"), Some(second));

    let err = store.register_island("Atoll").await.err().expect("duplicate");
    assert!(matches!(err, IsleError::Conflict { .. }));
    let err = store.register_island("  ").await.err().expect("blank");
    assert!(matches!(err, IsleError::InvalidInput { .. }));
    Ok(())
}

#[tokio::test]
async fn register_island_survives_backend_failure() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    store.register_island("Atoll").await?;
    drop_table(&store, "skyisle_islands").await;

    let island = store.register_island("Lagoon").await?;
    assert_eq!(island.id, IslandId(-1));
    assert!(island.id.is_provisional());
    assert_eq!(
        store.island(IslandId(-1)).map(|row| row.name),
        Some("Lagoon".to_string())
    );
    let second = store.register_island("Shoal").await?;
    assert_eq!(second.id, IslandId(-2));
    assert_eq!(store.top_islands(10).len(), 3);
    Ok(())
}

#[tokio::test]
async fn provisional_island_moves_to_backend_id_with_its_members() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    let atoll = store.register_island("Atoll").await?;
    run_sql(
        store.connection(),
        "CREATE TRIGGER block_lagoon BEFORE INSERT ON skyisle_islands \
         WHEN NEW.name = 'Lagoon' BEGIN SELECT RAISE(ABORT, 'blocked'); END",
    )
    .await;

    let steve = store.user(UserId::new(), "steve");
    let lagoon = store.create_island(steve.id, "Lagoon").await?;
    assert!(lagoon.id.is_provisional());
    assert_eq!(store.deposit(lagoon.id, "GOLD_INGOT", 5.0), Ok(5.0));
    assert!(matches!(
        store.record_block_placement(lagoon.id, "DIAMOND_BLOCK"),
        Ok(Some(_))
    ));

    run_sql(store.connection(), "DROP TRIGGER block_lagoon").await;
    let reef = store.register_island("Reef").await?;

    let lagoon_now = store.island_by_name("Lagoon").expect("lagoon survives");
    assert!(!lagoon_now.id.is_provisional());
    assert_ne!(lagoon_now.id, reef.id);
    assert_ne!(lagoon_now.id, atoll.id);
    assert_eq!(lagoon_now.value, 10.0);
    assert_eq!(store.island(lagoon.id), None);

    let members = store.members(lagoon_now.id);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, steve.id);
    assert_eq!(members[0].rank, Rank::Owner);
    assert!(store.members(reef.id).is_empty());
    assert_eq!(store.bank_balance(lagoon_now.id, "GOLD_INGOT"), 5.0);
    assert_eq!(store.block_count(lagoon_now.id, "DIAMOND_BLOCK"), 1);

    assert!(store.flush_all().await.iter().all(|report| report.ok));
    let reopened = open(dir.path()).await?;
    assert_eq!(
        reopened.island_by_name("Lagoon").map(|row| row.id),
        Some(lagoon_now.id)
    );
    assert_eq!(reopened.members(lagoon_now.id).len(), 1);
    assert!(reopened.members(reef.id).is_empty());
    Ok(())
}

#[tokio::test]
async fn flush_registers_provisional_islands_first() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    run_sql(
        store.connection(),
        "CREATE TRIGGER block_all BEFORE INSERT ON skyisle_islands \
         BEGIN SELECT RAISE(ABORT, 'blocked'); END",
    )
    .await;
    let owner = store.user(UserId::new(), "owner");
    let pending = store.create_island(owner.id, "Atoll").await?;
    assert!(pending.id.is_provisional());

    // rows of a provisional island are held back rather than written
    let reports = store.flush_all().await;
    assert!(reports.iter().all(|report| report.ok));
    assert!(open(dir.path()).await?.users().is_empty());

    run_sql(store.connection(), "DROP TRIGGER block_all").await;
    store.flush_all().await;
    let atoll = store.island_by_name("Atoll").expect("atoll");
    assert!(!atoll.id.is_provisional());

    let reopened = open(dir.path()).await?;
    let owner = reopened.users().get(&owner.id).expect("owner persisted");
    assert_eq!(owner.island_id, Some(atoll.id));
    Ok(())
}

#[tokio::test]
async fn registration_never_replaces_a_different_island_in_memory() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    store.register_island("Atoll").await?;
    store.islands().put(Island::new(IslandId(2), "Ghost"));

    let err = store.register_island("Reef").await.err().expect("id clash");
    assert!(matches!(err, IsleError::Conflict { .. }));
    assert_eq!(
        store.island(IslandId(2)).map(|row| row.name),
        Some("Ghost".to_string())
    );
    assert_eq!(store.island_by_name("Reef"), None);
    assert_eq!(open(dir.path()).await?.island_by_name("Reef"), None);
    Ok(())
}

#[tokio::test]
async fn create_island_makes_founder_owner() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    let founder = store.user(UserId::new(), "ada");

    let island = store.create_island(founder.id, "Atoll").await?;
    let founder = store.users().get(&founder.id).expect("founder");
    assert_eq!(founder.island_id, Some(island.id));
    assert_eq!(founder.rank, Rank::Owner);

    let err = store
        .create_island(founder.id, "Second")
        .await
        .err()
        .expect("already owns an island");
    assert!(matches!(err, IsleError::Conflict { .. }));
    let err = store
        .create_island(UserId::new(), "Ghost")
        .await
        .err()
        .expect("unknown user");
    assert!(matches!(err, IsleError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn create_island_yields_to_invite_accepted_meanwhile() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let store = Arc::new(open(base).await?);
    let alice = store.user(UserId::new(), "alice");
    let bob = store.user(UserId::new(), "bob");
    let home = store.create_island(alice.id, "Home").await?;
    store
        .invite(home.id, alice.id, bob.id, 1_000)
        .expect("owner may invite");

    // another connection holds the write lock so the insert has to wait
    let other = connect(&config(base), base).await?;
    let tx = other.begin().await.map_err(IsleError::from)?;
    tx.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "INSERT INTO skyisle_schematics (name, data) VALUES ('lock', x'00')".to_string(),
    ))
    .await
    .map_err(IsleError::from)?;

    let creating = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.create_island(bob.id, "Bobland").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let accepting = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.accept_invite(bob.id, home.id, 2_000).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.commit().await.map_err(IsleError::from)?;

    let accepted = accepting.await.expect("accept task");
    let created = creating.await.expect("create task");
    assert_eq!(accepted.map(|island| island.id), Ok(home.id));
    assert!(matches!(created, Err(IsleError::Conflict { .. })));

    let bob = store.users().get(&bob.id).expect("bob");
    assert_eq!(bob.island_id, Some(home.id));
    assert_eq!(bob.rank, Rank::Member);
    assert_eq!(store.island_by_name("Bobland"), None);
    assert_eq!(open(base).await?.island_by_name("Bobland"), None);
    Ok(())
}

#[tokio::test]
async fn invites_join_members_once() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    let owner = store.user(UserId::new(), "owner");
    let guest = store.user(UserId::new(), "guest");
    let island = store.create_island(owner.id, "Atoll").await?;

    assert_eq!(
        store.accept_invite(guest.id, island.id, 1_000).await,
        Err(Denial::NoInvite)
    );
    store
        .invite(island.id, owner.id, guest.id, 1_000)
        .expect("owner may invite");
    assert_eq!(store.invites().len(), 1);
    let joined = store
        .accept_invite(guest.id, island.id, 2_000)
        .await
        .expect("invite accepted");
    assert_eq!(joined.id, island.id);
    assert!(store.invites().is_empty());

    let guest = store.users().get(&guest.id).expect("guest");
    assert_eq!(guest.rank, Rank::Member);
    assert_eq!(store.members(island.id).len(), 2);

    // members cannot invite with default rules
    let stranger = store.user(UserId::new(), "stranger");
    assert_eq!(
        store.invite(island.id, guest.id, stranger.id, 3_000),
        Err(Denial::MissingCapability(Capability::Invite))
    );
    assert_eq!(
        store.invite(island.id, owner.id, guest.id, 3_000),
        Err(Denial::AlreadyInIsland)
    );
    Ok(())
}

#[tokio::test]
async fn expired_invites_are_dropped() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    let owner = store.user(UserId::new(), "owner");
    let late = store.user(UserId::new(), "late");
    let idle = store.user(UserId::new(), "idle");
    let island = store.create_island(owner.id, "Atoll").await?;

    store.invite(island.id, owner.id, late.id, 0).expect("invite");
    assert_eq!(
        store.accept_invite(late.id, island.id, 120_000).await,
        Err(Denial::InviteExpired)
    );
    assert!(store.invites().is_empty());

    store.invite(island.id, owner.id, idle.id, 0).expect("invite");
    store.flush_all().await;
    assert_eq!(store.purge_expired_invites(30_000).await, 0);
    assert_eq!(store.purge_expired_invites(120_000).await, 1);
    assert!(store.invites().is_empty());
    Ok(())
}

#[tokio::test]
async fn leave_and_kick_clear_membership() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    let owner = store.user(UserId::new(), "owner");
    let first = store.user(UserId::new(), "first");
    let second = store.user(UserId::new(), "second");
    let island = store.create_island(owner.id, "Atoll").await?;
    for member in [&first, &second] {
        store.invite(island.id, owner.id, member.id, 0).expect("invite");
        store
            .accept_invite(member.id, island.id, 0)
            .await
            .expect("accept");
    }

    assert_eq!(store.leave(owner.id), Err(Denial::OwnerCannotLeave));
    assert_eq!(store.leave(first.id), Ok(island.id));
    assert_eq!(store.leave(first.id), Err(Denial::NotInIsland));

    assert_eq!(
        store.kick(island.id, second.id, owner.id),
        Err(Denial::MissingCapability(Capability::Kick))
    );
    store.kick(island.id, owner.id, second.id).expect("owner kicks");
    assert_eq!(store.members(island.id).len(), 1);
    Ok(())
}

#[tokio::test]
async fn deleting_island_releases_members_and_leaves_leaderboard() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let (doomed, kept, members) = {
        let store = open(base).await?;
        let owner = store.user(UserId::new(), "owner");
        let member = store.user(UserId::new(), "member");
        let rival = store.user(UserId::new(), "rival");
        let doomed = store.create_island(owner.id, "Doomed").await?;
        let kept = store.create_island(rival.id, "Kept").await?;
        store.invite(doomed.id, owner.id, member.id, 0).expect("invite");
        store
            .accept_invite(member.id, doomed.id, 0)
            .await
            .expect("accept");
        store
            .record_block_placement(doomed.id, "DIAMOND_BLOCK")
            .expect("placement");
        store.deposit(doomed.id, "money", 50.0).expect("deposit");
        store.flush_all().await;

        let ranked: Vec<IslandId> = store.top_islands(10).iter().map(|row| row.id).collect();
        assert_eq!(ranked, vec![doomed.id, kept.id]);

        let removed = store.delete_island(doomed.id).await.expect("island existed");
        assert_eq!(removed.name, "Doomed");
        assert!(store.delete_island(doomed.id).await.is_none());

        let ranked: Vec<IslandId> = store.top_islands(10).iter().map(|row| row.id).collect();
        assert_eq!(ranked, vec![kept.id]);
        for id in [owner.id, member.id] {
            let user = store.users().get(&id).expect("user kept");
            assert_eq!(user.island_id, None);
            assert_eq!(user.rank, Rank::Visitor);
        }
        assert_eq!(store.block_count(doomed.id, "DIAMOND_BLOCK"), 0);
        assert_eq!(store.bank_balance(doomed.id, "money"), 0.0);
        (doomed, kept, [owner.id, member.id])
    };

    let store = open(base).await?;
    assert!(store.island(doomed.id).is_none());
    assert!(store.island(kept.id).is_some());
    for id in members {
        let user = store.users().get(&id).expect("user persisted");
        assert!(user.island_id.is_none());
    }
    assert!(store.blocks().is_empty());
    assert!(store.bank().is_empty());
    Ok(())
}

#[tokio::test]
async fn flush_persists_in_memory_mutations() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let owner_id = UserId::new();
    let island_id = {
        let store = open(base).await?;
        store.user(owner_id, "owner");
        let island = store.create_island(owner_id, "Atoll").await?;
        store
            .record_block_placement(island.id, "GOLD_BLOCK")
            .expect("placement");
        store.save_schematic("default", vec![1, 2, 3]).await;
        let reports = store.flush_all().await;
        assert_eq!(reports.len(), 8);
        assert!(reports.iter().all(|report| report.ok));
        island.id
    };

    let store = open(base).await?;
    let owner = store.users().get(&owner_id).expect("owner");
    assert_eq!(owner.island_id, Some(island_id));
    assert_eq!(owner.rank, Rank::Owner);
    assert_eq!(store.block_count(island_id, "GOLD_BLOCK"), 1);
    assert_eq!(store.island(island_id).map(|row| row.value), Some(5.0));
    assert_eq!(
        store.schematic("default").map(|row| row.data),
        Some(vec![1, 2, 3])
    );
    Ok(())
}

#[tokio::test]
async fn failed_flush_keeps_memory_authoritative() -> IsleResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open(dir.path()).await?;
    let owner = store.user(UserId::new(), "owner");
    store.create_island(owner.id, "Atoll").await?;
    drop_table(&store, "skyisle_users").await;

    let reports = store.flush_all().await;
    let users = reports
        .iter()
        .find(|report| report.kind == "user")
        .expect("user report");
    assert!(!users.ok);
    assert_eq!(users.rows, 1);
    assert_eq!(store.users().len(), 1);
    Ok(())
}
