use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::ApiClient;
use crate::clock::Clock;
use crate::models::{
    CreateGroupRequest, Group, GroupAnalytics, GroupMember, JoinGroupRequest, MemberAction,
    MemberActionRequest, TeamEntry, UpdateGroupRequest,
};
use crate::state::{AppState, Delta, Slice, Toast, apply_delta, surface_api_error};
use crate::time_format::parse_utc;

pub fn fetch_groups(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<Vec<Group>>("/groups", &[]) {
        Ok(groups) => apply_delta(state, Delta::SetGroups(groups)),
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

pub fn create_group(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    request: &CreateGroupRequest,
) {
    match client.post::<Group>("/groups", request) {
        Ok(group) => {
            let code = group.invite_code.clone();
            apply_delta(state, Delta::SetCurrentGroup(group));
            apply_delta(
                state,
                Delta::PushToast(Toast::success(
                    format!("Group created. Invite code: {code}"),
                    clock.now(),
                )),
            );
        }
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

pub fn fetch_group(client: &ApiClient, state: &mut AppState, clock: &Clock, group_id: u64) {
    let path = format!("/groups/{group_id}");
    match client.get::<Group>(&path, &[]) {
        Ok(group) => apply_delta(state, Delta::SetCurrentGroup(group)),
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

pub fn update_group(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    group_id: u64,
    request: &UpdateGroupRequest,
) {
    let path = format!("/groups/{group_id}");
    match client.put::<Group>(&path, request) {
        Ok(group) => {
            apply_delta(state, Delta::SetCurrentGroup(group));
            apply_delta(
                state,
                Delta::PushToast(Toast::success("Group updated", clock.now())),
            );
        }
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

/// Joining puts the caller into the group's pending queue; an admin approves
/// from there.
pub fn join_group(client: &ApiClient, state: &mut AppState, clock: &Clock, invite_code: &str) {
    let payload = JoinGroupRequest {
        invite_code: invite_code.trim().to_string(),
    };
    match client.post::<Group>("/groups/join", &payload) {
        Ok(group) => {
            let name = group.name.clone();
            apply_delta(state, Delta::SetCurrentGroup(group));
            apply_delta(
                state,
                Delta::PushToast(Toast::success(
                    format!("Join request sent to {name}"),
                    clock.now(),
                )),
            );
        }
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

pub fn leave_group(client: &ApiClient, state: &mut AppState, clock: &Clock, group_id: u64) {
    let path = format!("/groups/{group_id}/leave");
    match client.post_empty::<Value>(&path) {
        Ok(_) => {
            apply_delta(state, Delta::RemoveGroup(group_id));
            apply_delta(
                state,
                Delta::PushToast(Toast::info("You left the group", clock.now())),
            );
        }
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

pub fn fetch_members(client: &ApiClient, state: &mut AppState, clock: &Clock, group_id: u64) {
    let path = format!("/groups/{group_id}/members");
    match client.get::<Vec<GroupMember>>(&path, &[]) {
        Ok(members) => apply_delta(state, Delta::SetMembers(members)),
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

/// Admin moderation. Approve/reject return the updated member record and it
/// is merged in place; remove deletes the row client-side too.
pub fn member_action(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    group_id: u64,
    user_id: u64,
    action: MemberAction,
) {
    let path = format!("/groups/{group_id}/members");
    let payload = MemberActionRequest { user_id, action };
    if action == MemberAction::Remove {
        match client.post::<Value>(&path, &payload) {
            Ok(_) => {
                apply_delta(state, Delta::RemoveMember(user_id));
                apply_delta(
                    state,
                    Delta::PushToast(Toast::info("Member removed", clock.now())),
                );
            }
            Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
        }
        return;
    }

    match client.post::<GroupMember>(&path, &payload) {
        Ok(member) => {
            let message = match action {
                MemberAction::Approve => format!("{} approved", member.username),
                MemberAction::Reject => format!("{} rejected", member.username),
                MemberAction::Remove => unreachable!("handled above"),
            };
            apply_delta(state, Delta::UpsertMember(member));
            apply_delta(
                state,
                Delta::PushToast(Toast::success(message, clock.now())),
            );
        }
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

pub fn regenerate_code(client: &ApiClient, state: &mut AppState, clock: &Clock, group_id: u64) {
    let path = format!("/groups/{group_id}/regenerate-code");
    match client.post_empty::<Group>(&path) {
        Ok(group) => {
            let code = group.invite_code.clone();
            apply_delta(state, Delta::SetCurrentGroup(group));
            apply_delta(
                state,
                Delta::PushToast(Toast::success(
                    format!("New invite code: {code}"),
                    clock.now(),
                )),
            );
        }
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

pub fn fetch_group_analytics(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    group_id: u64,
) {
    let path = format!("/groups/{group_id}/analytics");
    match client.get::<GroupAnalytics>(&path, &[]) {
        Ok(analytics) => apply_delta(state, Delta::SetGroupAnalytics(analytics)),
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

/// Team list for a league; one of the few cacheable reads.
pub fn fetch_teams(client: &ApiClient, state: &mut AppState, clock: &Clock, league: &str) {
    match client.get::<Vec<TeamEntry>>("/groups/teams", &[("league", league)]) {
        Ok(teams) => apply_delta(state, Delta::SetTeams(teams)),
        Err(err) => surface_api_error(state, Slice::Groups, &err, clock.now()),
    }
}

/// Time-gated unlock of advanced group features (rivalries, analytics
/// extras): enabled once the group is `activation_weeks` old. The server
/// still enforces its side; this only decides what the view offers.
pub fn features_unlocked(group: &Group, now: DateTime<Utc>, activation_weeks: u32) -> bool {
    if activation_weeks == 0 {
        return true;
    }
    let Some(created) = parse_utc(&group.created_at) else {
        return false;
    };
    let weeks = now.signed_duration_since(created).num_weeks();
    weeks >= 0 && weeks as u64 >= activation_weeks as u64
}
