use crate::models::{Panel, PanelKind};

/// Panels partitioned by kind, each group in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedPanels<'a> {
    pub numbers: Vec<&'a Panel>,
    pub tables: Vec<&'a Panel>,
    pub pie_charts: Vec<&'a Panel>,
    pub gauges: Vec<&'a Panel>,
}

impl ClassifiedPanels<'_> {
    pub fn len(&self) -> usize {
        self.numbers.len() + self.tables.len() + self.pie_charts.len() + self.gauges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stable partition of `panels` by kind. Unknown kinds are left out.
pub fn classify(panels: &[Panel]) -> ClassifiedPanels<'_> {
    let mut classified = ClassifiedPanels::default();
    for panel in panels {
        match panel.kind {
            PanelKind::Number => classified.numbers.push(panel),
            PanelKind::Table => classified.tables.push(panel),
            PanelKind::Piechart => classified.pie_charts.push(panel),
            PanelKind::Gauge => classified.gauges.push(panel),
            PanelKind::Unknown => {
                tracing::debug!("Skipping panel '{}' with unknown kind", panel.name);
            }
        }
    }
    classified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_partition() {
        let panels = vec![
            Panel::new("g1", PanelKind::Gauge),
            Panel::new("n1", PanelKind::Number),
            Panel::new("x", PanelKind::Unknown),
            Panel::new("g2", PanelKind::Gauge),
            Panel::new("p1", PanelKind::Piechart),
            Panel::new("t1", PanelKind::Table),
            Panel::new("n2", PanelKind::Number),
        ];

        let classified = classify(&panels);
        let names = |group: &[&Panel]| group.iter().map(|p| p.name.clone()).collect::<Vec<_>>();

        assert_eq!(names(&classified.gauges), vec!["g1", "g2"]);
        assert_eq!(names(&classified.numbers), vec!["n1", "n2"]);
        assert_eq!(names(&classified.pie_charts), vec!["p1"]);
        assert_eq!(names(&classified.tables), vec!["t1"]);
        assert_eq!(classified.len(), 6);
    }

    #[test]
    fn test_empty_input() {
        assert!(classify(&[]).is_empty());
    }
}
