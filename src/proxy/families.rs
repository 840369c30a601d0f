use super::routes::{RouteTable, UpstreamRoute};

/// One upstream resource family served under `{mount}/{name}`.
#[derive(Debug)]
pub struct ProxyFamily {
    pub name: &'static str,
    pub routes: RouteTable,
    /// Client-facing message for transport failures.
    pub transport_error: &'static str,
}

pub static REPORTS: ProxyFamily = ProxyFamily {
    name: "reports",
    routes: RouteTable {
        routes: &[
            UpstreamRoute::json("list", "/reports"),
            UpstreamRoute::json("summary", "/reports/summary"),
            UpstreamRoute::json("detail", "/reports/{id}"),
            UpstreamRoute::spreadsheet("download", "/reports/{id}/download"),
        ],
        default_action: "list",
        id_action: Some("detail"),
    },
    transport_error: "Failed to fetch reports",
};

pub static APPLICANTS: ProxyFamily = ProxyFamily {
    name: "applicants",
    routes: RouteTable {
        routes: &[
            UpstreamRoute::json("list", "/applicants"),
            UpstreamRoute::json("detail", "/applicants/{id}"),
            UpstreamRoute::json("update", "/applicants/{id}"),
            UpstreamRoute::json("documents", "/applicants/{id}/documents"),
        ],
        default_action: "list",
        id_action: Some("detail"),
    },
    transport_error: "Failed to fetch applicants",
};

pub static EVENTS: ProxyFamily = ProxyFamily {
    name: "events",
    routes: RouteTable {
        routes: &[
            UpstreamRoute::json("list", "/events"),
            UpstreamRoute::json("detail", "/events/{id}"),
            UpstreamRoute::json("attendees", "/events/{id}/attendees"),
        ],
        default_action: "list",
        id_action: Some("detail"),
    },
    transport_error: "Failed to fetch events",
};

pub static LEADS: ProxyFamily = ProxyFamily {
    name: "leads",
    routes: RouteTable {
        routes: &[
            UpstreamRoute::json("list", "/leads"),
            UpstreamRoute::json("detail", "/leads/{id}"),
            UpstreamRoute::json("create", "/leads"),
        ],
        default_action: "list",
        id_action: Some("detail"),
    },
    transport_error: "Failed to fetch leads",
};

/// Every family the gateway mounts.
pub static FAMILIES: [&ProxyFamily; 4] = [&REPORTS, &APPLICANTS, &EVENTS, &LEADS];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn family_names_are_unique() {
        let names: HashSet<_> = FAMILIES.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), FAMILIES.len());
    }

    #[test]
    fn default_actions_exist() {
        for family in FAMILIES {
            let table = family.routes;
            assert!(
                table.routes.iter().any(|r| r.action == table.default_action),
                "{} default action missing",
                family.name
            );
            if let Some(id_action) = table.id_action {
                assert!(table.routes.iter().any(|r| r.action == id_action));
            }
        }
    }

    #[test]
    fn only_reports_download() {
        use super::super::routes::ResponseKind;
        for family in FAMILIES {
            let downloads = family
                .routes
                .routes
                .iter()
                .filter(|r| r.kind == ResponseKind::Spreadsheet)
                .count();
            assert_eq!(downloads, usize::from(family.name == "reports"));
        }
    }
}
