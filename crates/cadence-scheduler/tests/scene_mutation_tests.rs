// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use cadence_core::telemetry::SchedulerEvent;
use cadence_core::SceneError;
use common::{config_60hz, setup, started, SceneAction, NOMINAL_60HZ as N};

#[test]
fn test_scenes_requested_before_start_are_active_at_start() {
    let (mut scheduler, _clock, recorder) = setup(config_60hz(5, 5), &["level", "hud"]);

    scheduler.request_add_scene("level", true).unwrap();
    scheduler.request_add_scene("hud", true).unwrap();
    assert!(scheduler.scene_names().is_empty());

    scheduler.start();
    assert_eq!(scheduler.scene_names(), vec!["level", "hud"]);
    assert_eq!(recorder.take_log(), vec!["create:level", "create:hud"]);
}

#[test]
fn test_replace_then_remove_leaves_both_absent() {
    let (mut scheduler, clock, recorder) = started(config_60hz(5, 5), &["A", "B"], &["A"]);

    // --- 1. ARRANGE ---
    scheduler.request_replace_scene("A", "B").unwrap();
    scheduler.request_remove_scene("A").unwrap();

    // --- 2. ACT ---
    clock.advance(N);
    scheduler.advance_frame();

    // --- 3. ASSERT ---
    // Removal addresses the slot, which the replacement already took over.
    assert!(scheduler.scene_names().is_empty());
    assert_eq!(recorder.count("release:A"), 1);
    assert_eq!(recorder.count("release:B"), 1);
}

#[test]
fn test_second_replace_of_same_scene_keeps_the_first() {
    let (mut scheduler, clock, recorder) = started(config_60hz(5, 5), &["A", "B", "C"], &["A"]);
    recorder.take_log();

    // --- 1. ARRANGE ---
    scheduler.request_replace_scene("A", "B").unwrap();
    scheduler.request_replace_scene("A", "C").unwrap();
    assert_eq!(scheduler.pending_mutations(), 1);

    // --- 2. ACT ---
    clock.advance(N);
    scheduler.advance_frame();

    // --- 3. ASSERT ---
    assert_eq!(scheduler.scene_names(), vec!["B"]);
    assert_eq!(recorder.count("create:B"), 1);
    assert_eq!(recorder.count("release:B"), 0);
    assert_eq!(recorder.count("create:C"), 0);
}

#[test]
fn test_chained_replace_in_one_tick_is_rejected() {
    let (mut scheduler, clock, _recorder) = started(config_60hz(5, 5), &["A", "B", "C"], &["A"]);

    scheduler.request_replace_scene("A", "B").unwrap();
    assert_eq!(
        scheduler.request_replace_scene("B", "C"),
        Err(SceneError::NotFound("B".into()))
    );

    clock.advance(N);
    scheduler.advance_frame();
    assert_eq!(scheduler.scene_names(), vec!["B"]);

    // Once applied, the replacement is addressable by its new name.
    scheduler.request_replace_scene("B", "C").unwrap();
    clock.advance(N);
    scheduler.advance_frame();
    assert_eq!(scheduler.scene_names(), vec!["C"]);
}

#[test]
fn test_replace_rejected_eagerly_when_not_loadable() {
    let (mut scheduler, _clock, _recorder) = started(config_60hz(5, 5), &["A"], &["A"]);

    assert_eq!(
        scheduler.request_replace_scene("A", "missing"),
        Err(SceneError::NotLoadable("missing".into()))
    );
    assert_eq!(scheduler.pending_mutations(), 0);
}

#[test]
fn test_replace_of_unknown_scene_is_rejected() {
    let (mut scheduler, _clock, _recorder) = started(config_60hz(5, 5), &["A", "B"], &["A"]);

    assert_eq!(
        scheduler.request_replace_scene("ghost", "B"),
        Err(SceneError::NotFound("ghost".into()))
    );
    assert_eq!(scheduler.pending_mutations(), 0);
}

#[test]
fn test_remove_twice_does_single_removal() {
    let (mut scheduler, clock, recorder) = started(config_60hz(5, 5), &["A"], &["A"]);

    scheduler.request_remove_scene("A").unwrap();
    scheduler.request_remove_scene("A").unwrap();
    assert_eq!(scheduler.pending_mutations(), 1);

    clock.advance(N);
    scheduler.advance_frame();

    assert_eq!(recorder.count("release:A"), 1);
    assert!(scheduler.scene_names().is_empty());
}

#[test]
fn test_remove_of_unknown_scene_is_a_recoverable_error() {
    let (mut scheduler, _clock, _recorder) = started(config_60hz(5, 5), &["A"], &["A"]);

    assert_eq!(
        scheduler.request_remove_scene("ghost"),
        Err(SceneError::NotFound("ghost".into()))
    );
    assert_eq!(scheduler.pending_mutations(), 0);
    assert_eq!(scheduler.scene_names(), vec!["A"]);
}

#[test]
fn test_overlays_append_and_backgrounds_prepend() {
    let (mut scheduler, clock, _recorder) = started(
        config_60hz(5, 5),
        &["level", "hud", "sky", "far"],
        &["level"],
    );

    scheduler.request_add_scene("hud", true).unwrap();
    scheduler.request_add_scene("sky", false).unwrap();
    scheduler.request_add_scene("far", false).unwrap();

    clock.advance(N);
    scheduler.advance_frame();

    assert_eq!(scheduler.scene_names(), vec!["far", "sky", "level", "hud"]);
}

#[test]
fn test_replace_keeps_draw_order() {
    let (mut scheduler, clock, _recorder) = started(
        config_60hz(5, 5),
        &["sky", "level", "level2", "hud"],
        &["sky", "level", "hud"],
    );

    scheduler.request_replace_scene("level", "level2").unwrap();
    clock.advance(N);
    scheduler.advance_frame();

    assert_eq!(scheduler.scene_names(), vec!["sky", "level2", "hud"]);
}

#[test]
fn test_replace_onto_active_name_is_dropped_at_apply() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let (scheduler, clock, _recorder) = setup(config_60hz(5, 5), &["a", "b"]);
    let mut scheduler = scheduler.with_event_sink(tx);
    scheduler.request_add_scene("a", true).unwrap();
    scheduler.request_add_scene("b", true).unwrap();
    scheduler.start();

    scheduler.request_replace_scene("a", "b").unwrap();
    clock.advance(N);
    scheduler.advance_frame();

    assert_eq!(scheduler.scene_names(), vec!["a", "b"]);
    assert!(rx
        .try_iter()
        .any(|e| matches!(e, SchedulerEvent::SceneRejected { ref name, .. } if name == "b")));
}

#[test]
fn test_add_of_active_scene_is_rejected() {
    let (mut scheduler, _clock, _recorder) = started(config_60hz(5, 5), &["A"], &["A"]);

    assert_eq!(
        scheduler.request_add_scene("A", true),
        Err(SceneError::AlreadyExists("A".into()))
    );
}

#[test]
fn test_unloadable_add_is_dropped_at_apply() {
    let (mut scheduler, clock, _recorder) = started(config_60hz(5, 5), &["A"], &["A"]);

    scheduler.request_add_scene("ghost", true).unwrap();
    clock.advance(N);
    scheduler.advance_frame();

    assert_eq!(scheduler.scene_names(), vec!["A"]);
    assert_eq!(scheduler.pending_mutations(), 0);
}

#[test]
fn test_stage_requests_apply_at_end_of_tick() {
    let (mut scheduler, clock, recorder) =
        started(config_60hz(5, 5), &["level", "hud"], &["level"]);

    recorder.script("level", SceneAction::Add("hud".into(), true));
    clock.advance(3.0 * N);
    scheduler.advance_frame();

    assert_eq!(*recorder.results.borrow(), vec![true]);
    let hud_steps = recorder.steps_of("hud");
    assert_eq!(hud_steps.len(), 2);
    assert_eq!(hud_steps[0].index, 1);
    assert_eq!(scheduler.scene_names(), vec!["level", "hud"]);
}

#[test]
fn test_scene_removing_itself_finishes_its_tick() {
    let (mut scheduler, clock, recorder) =
        started(config_60hz(5, 5), &["level", "hud"], &["level", "hud"]);

    recorder.script("level", SceneAction::Remove("level".into()));
    clock.advance(2.0 * N);
    scheduler.advance_frame();

    assert_eq!(recorder.count("level:network"), 1);
    assert_eq!(recorder.count("level:scenegraph(AfterPhysics)"), 1);
    assert_eq!(recorder.count("hud:network"), 2);
    assert_eq!(scheduler.scene_names(), vec!["hud"]);
}

#[test]
fn test_stage_replace_validates_against_provider() {
    let (mut scheduler, clock, recorder) = started(config_60hz(5, 5), &["level"], &["level"]);

    recorder.script("level", SceneAction::Replace("level".into(), "missing".into()));
    clock.advance(N);
    scheduler.advance_frame();

    assert_eq!(*recorder.results.borrow(), vec![false]);
    assert_eq!(scheduler.scene_names(), vec!["level"]);
}

#[test]
fn test_host_requests_between_frames_wait_for_tick_end() {
    let (mut scheduler, clock, recorder) =
        started(config_60hz(5, 5), &["level", "hud"], &["level"]);

    scheduler.request_add_scene("hud", true).unwrap();
    clock.advance(2.0 * N);
    scheduler.advance_frame();

    assert_eq!(recorder.steps_of("hud").len(), 1);
}

#[test]
fn test_suspend_unknown_scene_fails() {
    let (mut scheduler, _clock, _recorder) = started(config_60hz(5, 5), &["A"], &["A"]);

    assert_eq!(
        scheduler.suspend_scene("ghost"),
        Err(SceneError::NotFound("ghost".into()))
    );
    assert_eq!(
        scheduler.resume_scene("ghost"),
        Err(SceneError::NotFound("ghost".into()))
    );
}
