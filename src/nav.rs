//! Navigation active-state highlighting and the mobile menu toggle.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    pub fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_owned(),
            href: href.to_owned(),
        }
    }
}

/// Index of the admin nav link whose href equals `path`.
pub fn active_link(links: &[NavLink], path: &str) -> Option<usize> {
    links.iter().position(|link| link.href == path)
}

/// Bottom-nav highlight: exact match first, otherwise the longest href that is
/// a whole-segment prefix of `path` (so `/admin/produtos/3` lights up `/admin/produtos`).
pub fn active_bottom_link(links: &[NavLink], path: &str) -> Option<usize> {
    if let Some(idx) = active_link(links, path) {
        return Some(idx);
    }
    links
        .iter()
        .enumerate()
        .filter(|(_, link)| is_segment_prefix(&link.href, path))
        .max_by_key(|(_, link)| link.href.len())
        .map(|(idx, _)| idx)
}

fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Collapsible admin menu on narrow layouts.
#[derive(Debug, Default, Clone, Copy)]
pub struct MobileMenu {
    pub open: bool,
}

impl MobileMenu {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Vec<NavLink> {
        vec![
            NavLink::new("Dashboard", "/admin"),
            NavLink::new("Produtos", "/admin/produtos"),
            NavLink::new("Novo", "/admin/produtos/novo"),
            NavLink::new("Loja", "/"),
        ]
    }

    #[test]
    fn admin_nav_needs_exact_match() {
        assert_eq!(active_link(&links(), "/admin/produtos"), Some(1));
        assert_eq!(active_link(&links(), "/admin/produtos/7"), None);
    }

    #[test]
    fn bottom_nav_falls_back_to_longest_prefix() {
        let links = links();
        assert_eq!(active_bottom_link(&links, "/admin/produtos/novo"), Some(2));
        assert_eq!(active_bottom_link(&links, "/admin/produtos/7/editar"), Some(1));
        assert_eq!(active_bottom_link(&links, "/admin/pedidos"), Some(0));
        assert_eq!(active_bottom_link(&links, "/administracao"), None);
        assert_eq!(active_bottom_link(&links, "/"), Some(3));
    }

    #[test]
    fn mobile_menu_toggles() {
        let mut menu = MobileMenu::default();
        menu.toggle();
        assert!(menu.open);
        menu.toggle();
        assert!(!menu.open);
    }
}
