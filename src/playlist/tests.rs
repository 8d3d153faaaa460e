use super::*;
use crate::config::MalformedPolicy;
use crate::error::PersistenceError;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn t(title: &str) -> Track {
    Track::new(title, format!("downloads/{title}.mp3"))
}

fn sample(n: usize) -> Playlist {
    Playlist::from_tracks((0..n).map(|i| t(&format!("Song {i}"))).collect())
}

fn titles(p: &Playlist) -> Vec<String> {
    p.active().map(|t| t.title.clone()).collect()
}

#[test]
fn add_appends_to_both_orders() {
    let mut p = sample(2);
    let mut rng = StdRng::seed_from_u64(7);
    p.set_shuffle_with(true, 0, &mut rng);
    p.add(t("Late"));

    assert_eq!(p.len(), 3);
    assert_eq!(p.get(2), Some(&t("Late")));
    assert_eq!(p.original().last(), Some(&t("Late")));
}

#[test]
fn add_many_keeps_the_given_order() {
    let mut p = sample(1);
    p.add_many(vec![t("B"), t("A")]);
    assert_eq!(titles(&p), vec!["Song 0", "B", "A"]);
}

#[test]
fn clear_empties_everything() {
    let mut p = sample(3);
    p.clear();
    assert!(p.is_empty());
    assert_eq!(p.active().count(), 0);
    assert!(p.original().is_empty());
    assert_eq!(p.get(0), None);
}

#[test]
fn shuffle_round_trip_restores_insertion_order_and_current_track() {
    let mut p = sample(8);
    let before = titles(&p);
    let mut rng = StdRng::seed_from_u64(42);

    let current = 5;
    let playing = p.get(current).cloned();

    let shuffled_pos = p.set_shuffle_with(true, current, &mut rng);
    assert!(p.is_shuffled());
    assert_eq!(p.get(shuffled_pos).cloned(), playing);

    let restored_pos = p.set_shuffle_with(false, shuffled_pos, &mut rng);
    assert!(!p.is_shuffled());
    assert_eq!(titles(&p), before);
    assert_eq!(restored_pos, current);
    assert_eq!(p.get(restored_pos).cloned(), playing);
}

#[test]
fn shuffle_is_a_permutation() {
    let mut p = sample(20);
    let mut rng = StdRng::seed_from_u64(1);
    p.set_shuffle_with(true, 0, &mut rng);

    let mut got = titles(&p);
    got.sort();
    let mut want: Vec<String> = p.original().iter().map(|t| t.title.clone()).collect();
    want.sort();
    assert_eq!(got, want);
}

#[test]
fn unshuffle_follows_the_exact_slot_with_duplicate_tracks() {
    // Same title + path three times: value lookup would be ambiguous.
    let dup = t("Same");
    let mut p = Playlist::from_tracks(vec![dup.clone(), t("Other"), dup.clone(), dup]);
    let mut rng = StdRng::seed_from_u64(3);

    let pos = p.set_shuffle_with(true, 2, &mut rng);
    let back = p.set_shuffle_with(false, pos, &mut rng);
    assert_eq!(back, 2);
}

#[test]
fn setting_shuffle_to_current_value_is_a_noop() {
    let mut p = sample(4);
    let mut rng = StdRng::seed_from_u64(9);
    assert_eq!(p.set_shuffle_with(false, 3, &mut rng), 3);
    assert_eq!(titles(&p), titles(&sample(4)));
}

#[test]
fn shuffle_on_empty_playlist_yields_zero() {
    let mut p = Playlist::default();
    assert_eq!(p.set_shuffle(true, 0), 0);
    assert_eq!(p.set_shuffle(false, 0), 0);
}

#[test]
fn save_then_load_reproduces_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlaylistStore::new(dir.path().join("nested/playlist.json"), MalformedPolicy::Fail);

    let mut p = sample(5);
    let mut rng = StdRng::seed_from_u64(11);
    p.set_shuffle_with(true, 0, &mut rng);
    store.save(&p).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded, p.original().to_vec());
}

#[test]
fn saved_file_uses_tracks_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlist.json");
    let store = PlaylistStore::new(&path, MalformedPolicy::Fail);
    store.save(&Playlist::from_tracks(vec![t("A")])).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["tracks"][0]["title"], "A");
    assert_eq!(raw["tracks"][0]["path"], "downloads/A.mp3");
}

#[test]
fn load_reads_files_written_by_hand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlist.json");
    std::fs::write(
        &path,
        r#"{"tracks": [{"title": "One", "path": "downloads/One.mp3"}, {"title": "Two", "path": "downloads/Two.mp3"}]}"#,
    )
    .unwrap();

    let tracks = PlaylistStore::new(&path, MalformedPolicy::Fail).load().unwrap();
    assert_eq!(tracks, vec![t("One"), t("Two")]);
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlaylistStore::new(dir.path().join("absent.json"), MalformedPolicy::Fail);
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn malformed_file_fails_loudly_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlist.json");
    std::fs::write(&path, r#"{"tracks": [{"title": "One"}"#).unwrap();

    let store = PlaylistStore::new(&path, MalformedPolicy::Fail);
    assert!(matches!(store.load(), Err(PersistenceError::Malformed { .. })));
    assert!(matches!(
        store.load_with_policy(),
        Err(PersistenceError::Malformed { .. })
    ));
}

#[test]
fn malformed_file_can_start_empty_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlist.json");
    std::fs::write(&path, "not json").unwrap();

    let store = PlaylistStore::new(&path, MalformedPolicy::StartEmpty);
    let (tracks, err) = store.load_with_policy().unwrap();
    assert!(tracks.is_empty());
    assert!(matches!(err, Some(PersistenceError::Malformed { .. })));
}
