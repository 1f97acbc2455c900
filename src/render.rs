// Plain-text rendering of decoded payloads. Every function returns the text
// instead of printing so the UI decides where it goes.

use crate::models::{
    Acknowledgement, DeployResult, EvoPermissions, Instance, InstanceState, OsGroup, Plan,
    RebuildResult, Renewal, SshKey, UserInfo,
};

const RULE: &str = "--------------------";

/// Visible prefix of an SSH public key.
const KEY_PREVIEW_CHARS: usize = 40;

pub fn instances(list: &[Instance]) -> String {
    if list.is_empty() {
        return "No instances found.\n".into();
    }
    let mut out = String::from("--- Instances ---\n");
    for inst in list {
        out.push_str(&format!(
            "ID: {} | Hostname: {} | IPv4: {} | Status: {}\n\
             \x20 Spec: {} CPU / {}MB RAM / {}GB {}\n\
             \x20 OS: {} | Region: {}\n\
             \x20 Password: {}\n\
             \x20 Expires: {}\n\
             {RULE}\n",
            inst.id,
            inst.hostname,
            inst.ipv4,
            inst.status,
            inst.cpu,
            inst.memory,
            inst.disk,
            inst.disk_type,
            inst.os,
            inst.region,
            inst.password,
            inst.expiration_at,
        ));
    }
    out
}

pub fn deploy_result(res: &DeployResult) -> String {
    format!(
        "--- Instance deployed ---\n\
         ID: {}\n\
         Hostname: {}\n\
         IPv4: {}\n\
         IPv6: {}\n\
         Password: {}\n\
         {RULE}\n",
        res.id, res.hostname, res.ipv4, res.ipv6, res.password
    )
}

pub fn acknowledgement(ack: &Acknowledgement) -> String {
    format!("Success: {}\n", ack.message())
}

pub fn rebuild_result(res: &RebuildResult) -> String {
    format!(
        "--- Instance rebuilt ---\n\
         Hostname: {}\n\
         IPv4: {}\n\
         IPv6: {}\n\
         New password: {}\n\
         {RULE}\n",
        res.hostname, res.ipv4, res.ipv6, res.password
    )
}

pub fn plans(list: &[Plan]) -> String {
    if list.is_empty() {
        return "No plans available.\n".into();
    }
    let mut out = String::from("--- Plans ---\n");
    for plan in list {
        out.push_str(&format!(
            "ID: {} | Name: {} | Stock: {}\n\
             \x20 Spec: {} CPU / {}MB RAM / {}GB Disk\n\
             \x20 Network: {}\n\
             \x20 Operating systems:\n",
            plan.id, plan.name, plan.stock, plan.cpu, plan.memory, plan.disk, plan.network_speed
        ));
        out.push_str(&os_group_lines(&plan.os_groups, "    "));
        out.push_str(RULE);
        out.push('\n');
    }
    out
}

pub fn os_groups(groups: &[OsGroup]) -> String {
    if groups.is_empty() {
        return "No operating systems available.\n".into();
    }
    format!(
        "--- Operating systems ---\n{}{RULE}\n",
        os_group_lines(groups, "")
    )
}

fn os_group_lines(groups: &[OsGroup], indent: &str) -> String {
    let mut out = String::new();
    for group in groups {
        out.push_str(&format!("{indent}- {}:\n", group.group_name));
        for os in &group.os_list {
            out.push_str(&format!("{indent}  ID: {}, Name: {}\n", os.id, os.name));
        }
    }
    out
}

pub fn renewal(res: &Renewal) -> String {
    format!(
        "--- Instance renewed ---\n\
         Expires: {}\n\
         Added: {} hours\n\
         Total service time: {} hours\n\
         {RULE}\n",
        res.expiration_at, res.added_hours, res.total_service_hours
    )
}

pub fn instance_state(res: &InstanceState) -> String {
    let memory = &res.state.memory;
    let traffic = &res.state.traffic;
    format!(
        "--- Instance state ---\n\
         Name: {} | Status: {} | State: {}\n\
         OS: {} ({})\n\
         Memory: {:.2} / {:.2} GB available\n\
         Traffic (in/out/total): {:.2} / {:.2} / {:.2} MB\n\
         {RULE}\n",
        res.name,
        res.status,
        res.state.state,
        res.system.name,
        res.system.group_name,
        kib_to_gib(&memory.available),
        kib_to_gib(&memory.total),
        bytes_to_mib(traffic.inbound),
        bytes_to_mib(traffic.outbound),
        bytes_to_mib(traffic.total),
    )
}

/// Unparseable values render as zero.
fn kib_to_gib(kib: &str) -> f64 {
    kib.trim().parse::<f64>().unwrap_or(0.0) / 1024.0 / 1024.0
}

#[allow(clippy::cast_precision_loss)]
fn bytes_to_mib(bytes: i64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

pub fn ssh_keys(keys: &[SshKey]) -> String {
    if keys.is_empty() {
        return "No SSH keys found.\n".into();
    }
    let mut out = String::from("--- SSH keys ---\n");
    for key in keys {
        out.push_str(&format!(
            "ID: {} | Name: {} | Created: {}\n\
             \x20 Public key: {}\n\
             {RULE}\n",
            key.id,
            key.name,
            key.created_at,
            key_preview(&key.public_key)
        ));
    }
    out
}

fn key_preview(key: &str) -> String {
    match key.char_indices().nth(KEY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &key[..cut]),
        None => key.to_string(),
    }
}

pub fn evo_permissions(perms: &EvoPermissions) -> String {
    format!(
        "--- EVO permissions ---\n\
         User ID: {}\n\
         Plan: {}\n\
         Max time: {} hours\n\
         Allowed packages: {}\n\
         {RULE}\n",
        perms.user_id, perms.plan, perms.max_time, perms.allow_packages
    )
}

pub fn user_info(info: &UserInfo) -> String {
    format!(
        "--- User info ---\n\
         ID: {}\n\
         Username: {}\n\
         Email: {}\n\
         Credit: {}\n\
         {RULE}\n",
        info.id, info.username, info.email, info.credit
    )
}
