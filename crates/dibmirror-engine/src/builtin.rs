//! Templates compiled into the binary

/// `(template id, source)` for every default target file
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "centos-minimal/base.repo.j2",
        include_str!("../templates/centos-minimal/base.repo.j2"),
    ),
    (
        "centos-minimal/updates.repo.j2",
        include_str!("../templates/centos-minimal/updates.repo.j2"),
    ),
    (
        "centos-minimal/extras.repo.j2",
        include_str!("../templates/centos-minimal/extras.repo.j2"),
    ),
    (
        "fedora-minimal/default/fedora.repo.j2",
        include_str!("../templates/fedora-minimal/default/fedora.repo.j2"),
    ),
    (
        "fedora-minimal/default/fedora-updates.repo.j2",
        include_str!("../templates/fedora-minimal/default/fedora-updates.repo.j2"),
    ),
    (
        "fedora-minimal/28/fedora.repo.j2",
        include_str!("../templates/fedora-minimal/28/fedora.repo.j2"),
    ),
    (
        "fedora-minimal/28/fedora-updates.repo.j2",
        include_str!("../templates/fedora-minimal/28/fedora-updates.repo.j2"),
    ),
];

pub fn get(id: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, source)| *source)
}
