// ============================================================================
// TrayPanel - rendu terminal du tray
// ============================================================================
// Affiche l'état du tray dans le terminal :
// - barre du haut : badge d'icône, titre ("$50,000.5") et tooltip
// - menu : un item par actif, "clic" avec Entrée ou un chiffre
//
// CONCEPTS RATATUI :
// 1. Layout : header / menu / footer
// 2. List + ListState : surbrillance de l'item sous le curseur
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::Asset;
use crate::tray::{Icon, TrayModel, TraySurface};

/// État affiché par le terminal : le tray + le curseur du menu
#[derive(Debug, Clone)]
pub struct TrayPanel {
    pub model: TrayModel,
    cursor: usize,
}

impl TrayPanel {
    pub fn new(model: TrayModel) -> Self {
        Self { model, cursor: 0 }
    }

    /// Index de l'item sous le curseur
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Déplace le curseur vers le haut (s'arrête au premier item)
    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Déplace le curseur vers le bas (s'arrête au dernier item)
    pub fn move_down(&mut self) {
        let max_index = self.model.items.len().saturating_sub(1);
        self.cursor = (self.cursor + 1).min(max_index);
    }

    /// Actif sous le curseur
    pub fn highlighted(&self) -> Option<Asset> {
        self.asset_at(self.cursor)
    }

    /// Actif à une position du menu
    pub fn asset_at(&self, index: usize) -> Option<Asset> {
        self.model.items.get(index).map(|item| item.asset)
    }
}

impl TraySurface for TrayPanel {
    fn set_icon(&mut self, icon: Icon) {
        self.model.set_icon(icon);
    }

    fn set_title(&mut self, title: &str) {
        self.model.set_title(title);
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.model.set_tooltip(tooltip);
    }

    fn set_item(&mut self, asset: Asset, label: &str, tooltip: &str) {
        self.model.set_item(asset, label, tooltip);
    }
}

// ============================================================================
// Rendu
// ============================================================================

/// Dessine le tray
///
/// `selected` : actif affiché dans le titre, marqué d'un ● dans le menu
pub fn render(frame: &mut Frame, panel: &TrayPanel, selected: Asset) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Tray : titre + tooltip
            Constraint::Min(0),    // Menu des actifs
            Constraint::Length(3), // Aide
        ])
        .split(frame.size());

    render_tray_bar(frame, panel, chunks[0]);
    render_menu(frame, panel, selected, chunks[1]);
    render_footer(frame, chunks[2]);
}

/// Badge de l'icône courante ("[BTC]"), vide si aucune icône n'a été chargée
fn icon_badge(icon: Option<&Icon>) -> String {
    match icon {
        Some(icon) => format!("[{}]", icon.asset.code().to_uppercase()),
        None => "[ ]".to_string(),
    }
}

fn render_tray_bar(frame: &mut Frame, panel: &TrayPanel, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Bitso ")
        .title_alignment(Alignment::Center);

    let text = vec![
        Line::from(vec![
            Span::styled(
                icon_badge(panel.model.icon.as_ref()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(" "),
            Span::styled(
                panel.model.title.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            panel.model.tooltip.clone(),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_menu(frame: &mut Frame, panel: &TrayPanel, selected: Asset, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Actifs ");

    let items: Vec<ListItem> = panel
        .model
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if item.asset == selected { "●" } else { " " };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} {}. ", marker, i + 1)),
                Span::styled(format!("{:<24}", item.label), Style::default().fg(Color::White)),
                Span::styled(item.tooltip.clone(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(panel.cursor()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled("↑↓", Style::default().fg(Color::Yellow)),
        Span::raw(" naviguer  "),
        Span::styled("Entrée", Style::default().fg(Color::Yellow)),
        Span::raw(" sélectionner  "),
        Span::styled("1-3", Style::default().fg(Color::Yellow)),
        Span::raw(" sélection directe  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quitter"),
    ]);

    let paragraph = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn panel() -> TrayPanel {
        TrayPanel::new(TrayModel::new(&Asset::ALL, "Bitso!", "Loading data."))
    }

    #[test]
    fn test_cursor_navigation() {
        let mut panel = panel();
        assert_eq!(panel.highlighted(), Some(Asset::Btc));

        panel.move_down();
        panel.move_down();
        panel.move_down();
        assert_eq!(panel.highlighted(), Some(Asset::Xrp));

        panel.move_up();
        assert_eq!(panel.highlighted(), Some(Asset::Eth));
        assert_eq!(panel.asset_at(5), None);
    }

    #[test]
    fn test_surface_delegates_to_model() {
        let mut panel = panel();
        panel.set_title("$8.9");
        panel.set_item(Asset::Xrp, "Xrp: $8.9", "Updated on 10:00:00");

        assert_eq!(panel.model.title, "$8.9");
        assert_eq!(panel.model.item(Asset::Xrp).unwrap().label, "Xrp: $8.9");
    }

    #[test]
    fn test_icon_badge() {
        assert_eq!(icon_badge(None), "[ ]");
        let icon = Icon {
            asset: Asset::Eth,
            path: "assets/eth.ico".into(),
            bytes: vec![0u8; 4].into(),
        };
        assert_eq!(icon_badge(Some(&icon)), "[ETH]");
    }

    #[test]
    fn test_render_shows_title_and_tooltip() {
        let mut panel = panel();
        panel.set_title("$50,000.5");
        panel.set_tooltip("Updated on 12:00:00");

        let mut terminal = Terminal::new(TestBackend::new(80, 14)).unwrap();
        terminal
            .draw(|frame| render(frame, &panel, Asset::Btc))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("$50,000.5"));
        assert!(content.contains("Updated on 12:00:00"));
        assert!(content.contains("Ethereum"));
    }
}
