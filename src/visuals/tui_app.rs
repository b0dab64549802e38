use std::{io::Result, time::Duration};

use crossterm::event::{self, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{block::Title, Block, BorderType, Borders, Paragraph},
    Frame,
};
use tokio::{runtime::Handle, sync::watch};
use tracing::debug;

use crate::{
    logic::{
        acquire_constants::{BOARD_COLS, BOARD_ROWS, STOCK_TO_BUY_PER_TURN},
        acquire_request::AcquireRequest,
        acquire_response::AcquireResponse,
        game_board::{Cell, TileStatus},
        game_snapshot::{GameSnapshot, SnapshotMirror},
        hotel_data::Hotel,
        player::PlayerId,
        stock_market::StockPurchase,
        tile::Tile,
    },
    room::RoomHandle,
};

struct InnerRects {
    game_board: Rect,
    stocks: Rect,
    available_tiles: Rect,
    cash: Rect,
}

/// A human seat played from this terminal.
pub struct Seat {
    id: PlayerId,
    updates: watch::Receiver<GameSnapshot>,
    mirror: SnapshotMirror,
}

impl Seat {
    pub fn new(id: PlayerId, updates: watch::Receiver<GameSnapshot>) -> Self {
        Seat {
            id,
            updates,
            mirror: SnapshotMirror::new(),
        }
    }
}

/// Input collected over several key presses before it is sent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Draft {
    cart: StockPurchase,
    sell: u32,
    trade: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Nothing,
    Quit,
    Submit(AcquireResponse),
}

/// Turns a key press into an action for the seat `view` belongs to.
pub fn handle_key(view: &GameSnapshot, draft: &mut Draft, key: KeyCode) -> KeyOutcome {
    if key == KeyCode::Char('q') {
        return KeyOutcome::Quit;
    }
    let Some(you) = view.you.as_ref().filter(|_| view.is_my_turn()) else {
        return KeyOutcome::Nothing;
    };
    let chain_key = |options: &[Hotel]| match key {
        KeyCode::Char(c) => Hotel::from_initial(c).filter(|hotel| options.contains(hotel)),
        _ => None,
    };

    match &view.request {
        AcquireRequest::PlaceTile { .. } => match key {
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                match you.hand.get(index) {
                    Some((tile, _)) => KeyOutcome::Submit(AcquireResponse::PlaceTile { tile: *tile }),
                    None => KeyOutcome::Nothing,
                }
            }
            _ => KeyOutcome::Nothing,
        },
        AcquireRequest::FoundChain { options, .. } => match chain_key(options) {
            Some(chain) => KeyOutcome::Submit(AcquireResponse::FoundChain { chain }),
            None => KeyOutcome::Nothing,
        },
        AcquireRequest::ChooseMergerSurvivor { tied, .. } => match chain_key(tied) {
            Some(surviving_chain) => KeyOutcome::Submit(AcquireResponse::MergerChoice { surviving_chain }),
            None => KeyOutcome::Nothing,
        },
        AcquireRequest::DisposeStock {
            defunct_chain,
            holding,
            trade_available,
            ..
        } => {
            let undecided = holding - (draft.sell + draft.trade).min(*holding);
            match key {
                KeyCode::Char('s') if undecided >= 1 => draft.sell += 1,
                KeyCode::Char('t') if *trade_available && undecided >= 2 => draft.trade += 2,
                KeyCode::Char('r') => *draft = Draft::default(),
                KeyCode::Enter => {
                    let response = AcquireResponse::MergerDisposition {
                        defunct_chain: *defunct_chain,
                        sell: draft.sell,
                        trade: draft.trade,
                        hold: undecided,
                    };
                    *draft = Draft::default();
                    return KeyOutcome::Submit(response);
                }
                _ => {}
            }
            KeyOutcome::Nothing
        }
        AcquireRequest::BuyStock {
            end_game_available, ..
        } => {
            match key {
                KeyCode::Char('e') if *end_game_available => {
                    *draft = Draft::default();
                    return KeyOutcome::Submit(AcquireResponse::EndGame);
                }
                KeyCode::Backspace => draft.cart.clear(),
                KeyCode::Enter => {
                    let purchases = std::mem::take(&mut draft.cart);
                    return KeyOutcome::Submit(match purchases.is_empty() {
                        true => AcquireResponse::EndTurn,
                        false => AcquireResponse::BuyStocks { purchases },
                    });
                }
                _ => {
                    let in_cart: u32 = draft.cart.values().sum();
                    if let Some(hotel) = chain_key(&view.active_chains) {
                        if in_cart < STOCK_TO_BUY_PER_TURN {
                            *draft.cart.entry(hotel).or_insert(0) += 1;
                        }
                    }
                }
            }
            KeyOutcome::Nothing
        }
        AcquireRequest::GameOver => KeyOutcome::Nothing,
    }
}

fn hotel_color(hotel: Hotel) -> Color {
    match hotel {
        Hotel::Tower => Color::Yellow,
        Hotel::Luxor => Color::Red,
        Hotel::American => Color::Blue,
        Hotel::Worldwide => Color::Magenta,
        Hotel::Festival => Color::Green,
        Hotel::Imperial => Color::LightRed,
        Hotel::Continental => Color::Cyan,
    }
}

#[derive(typed_builder::TypedBuilder)]
pub struct TuiApp {
    cell_width: u16,
    cell_height: u16,
    room: RoomHandle,
    runtime: Handle,
    seats: Vec<Seat>,
    #[builder(default)]
    draft: Draft,
    #[builder(default)]
    status: Option<String>,
    #[builder(default = false)]
    exit: bool,
}

impl TuiApp {
    pub fn run(&mut self, terminal: &mut super::tui::Tui) -> Result<()> {
        while !self.exit {
            self.sync();
            terminal.draw(|frame| self.render_frame(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn sync(&mut self) {
        for seat in &mut self.seats {
            let snapshot = seat.updates.borrow_and_update().clone();
            if seat.mirror.apply(snapshot) {
                debug!(seat = %seat.id, "snapshot updated");
            }
        }
    }

    // Hot seat: show whichever local seat the game is waiting on.
    fn view(&self) -> Option<&GameSnapshot> {
        let views: Vec<&GameSnapshot> = self
            .seats
            .iter()
            .filter_map(|seat| seat.mirror.latest())
            .collect();
        views
            .iter()
            .copied()
            .find(|view| view.is_my_turn())
            .or(views.first().copied())
    }

    fn handle_events(&mut self) -> Result<()> {
        if !event::poll(Duration::from_millis(250))? {
            return Ok(());
        }
        let event::Event::Key(key) = event::read()? else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let Some(view) = self.view().cloned() else {
            self.exit = key.code == KeyCode::Char('q');
            return Ok(());
        };
        match handle_key(&view, &mut self.draft, key.code) {
            KeyOutcome::Quit => self.exit = true,
            KeyOutcome::Nothing => {}
            KeyOutcome::Submit(action) => self.submit(&view, action),
        }
        Ok(())
    }

    fn submit(&mut self, view: &GameSnapshot, action: AcquireResponse) {
        let Some(seat) = view.you.as_ref().map(|you| you.id) else {
            return;
        };
        let description = action.to_string();
        self.status = match self.runtime.block_on(self.room.submit(seat, action)) {
            Ok(_) => Some(format!("{} {}", seat, description)),
            Err(error) => Some(format!("Rejected: {}", error)),
        };
        debug!(%seat, status = ?self.status, "submitted from terminal");
    }

    fn render_frame(&self, frame: &mut Frame) {
        let inner_rects = self.split_rects(frame.size());
        let Some(view) = self.view() else {
            frame.render_widget(Paragraph::new("Waiting for the room...").centered(), frame.size());
            return;
        };
        self.render_game_board(view, inner_rects.game_board, frame);
        self.render_stocks(view, inner_rects.stocks, frame);
        self.render_available_tiles(view, inner_rects.available_tiles, frame);
        self.render_cash(view, inner_rects.cash, frame);
    }

    fn split_rects(&self, rect: Rect) -> InnerRects {
        let stock_width = (self.cell_width * 5).max(40).min(rect.width);
        let available_tiles_height = (self.cell_height * 2).max(6).min(rect.height);
        let game_board_width = rect.width.saturating_sub(stock_width);
        let game_board_height = rect.height.saturating_sub(available_tiles_height);

        let stocks = Rect {
            x: rect.right() - stock_width,
            y: rect.y,
            width: stock_width,
            height: game_board_height,
        };

        let available_tiles = Rect {
            x: rect.x,
            y: rect.bottom() - available_tiles_height,
            width: game_board_width,
            height: available_tiles_height,
        };

        let game_board = Rect {
            x: rect.x,
            y: rect.y,
            width: game_board_width,
            height: game_board_height,
        };

        let cash = Rect {
            x: game_board.right(),
            y: game_board.bottom(),
            width: rect.width - game_board_width,
            height: available_tiles_height,
        };

        InnerRects {
            game_board,
            stocks,
            available_tiles,
            cash,
        }
    }

    fn titled_block(title: &str) -> Block {
        let title = Title::from(Span::from(format!(" {} ", title)).bold());
        Block::default()
            .title(title.alignment(Alignment::Center))
            .borders(Borders::ALL)
            .border_set(border::THICK)
            .border_type(BorderType::Rounded)
    }

    fn render_game_board(&self, view: &GameSnapshot, area: Rect, frame: &mut Frame) -> Rect {
        let title = match view.you.as_ref() {
            Some(you) => format!("acTUIre: {}'s view, {:?}", you.id, view.phase),
            None => "acTUIre".to_string(),
        };
        let block = Self::titled_block(&title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cell_width = self.cell_width;
        let cell_height = self.cell_height;

        let padding = 1;
        let grid_width = (cell_width * BOARD_COLS as u16 + 2 * padding).min(inner.width);
        let grid_height = (cell_height * BOARD_ROWS as u16 + 2 * padding).min(inner.height);

        let row_constraints = std::iter::repeat(Constraint::Length(cell_height))
            .take(BOARD_ROWS)
            .collect::<Vec<_>>();

        let col_constraints = std::iter::repeat(Constraint::Length(cell_width))
            .take(BOARD_COLS)
            .collect::<Vec<_>>();

        let (center_x, center_y) = (inner.x + inner.width / 2, inner.y + inner.height / 2);
        let board_rect = Rect {
            x: center_x - grid_width / 2,
            y: center_y - grid_height / 2,
            width: grid_width,
            height: grid_height,
        };

        let board_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);

        frame.render_widget(board_block, board_rect);

        let in_hand: Vec<Tile> = view
            .you
            .as_ref()
            .map(|you| you.hand.iter().map(|(tile, _)| *tile).collect())
            .unwrap_or_default();

        let row_rects = Layout::default()
            .direction(Direction::Vertical)
            .vertical_margin(1)
            .horizontal_margin(0)
            .constraints(row_constraints)
            .split(board_rect);

        for (r, row_rect) in row_rects.iter().enumerate() {
            let col_rects = Layout::default()
                .direction(Direction::Horizontal)
                .vertical_margin(0)
                .horizontal_margin(1)
                .constraints(col_constraints.clone())
                .split(*row_rect);

            for (c, cell_rect) in col_rects.iter().enumerate() {
                let tile: Tile = (r, c).into();
                let cell = view.cell(tile);
                let label = match cell {
                    Cell::Hotel(hotel) => hotel.initial().to_string(),
                    _ => tile.to_string(),
                };
                let single_row_text = format!(
                    "{:^length$}",
                    label,
                    length = cell_width.saturating_sub(2).into()
                );

                let pad_line = " ".repeat(cell_width.into());

                // the text line and the two borders are never padding
                let num_pad_lines = (cell_height as usize).saturating_sub(3);

                let text = std::iter::repeat(pad_line.clone())
                    .take(num_pad_lines / 2)
                    .chain(std::iter::once(single_row_text))
                    .chain(std::iter::repeat(pad_line).take(num_pad_lines / 2))
                    .collect::<Vec<_>>()
                    .join("\n");

                let style = self.get_cell_text_style(cell, in_hand.contains(&tile));
                let cell_text = Paragraph::new(text)
                    .block(self.get_cell_block(style))
                    .style(style)
                    .alignment(Alignment::Center);
                frame.render_widget(cell_text, *cell_rect);
            }
        }
        inner
    }

    fn get_cell_block(&self, style: Style) -> Block {
        Block::default()
            .borders(Borders::ALL)
            .style(style)
            .border_type(BorderType::Rounded)
    }

    fn get_cell_text_style(&self, cell: Cell, in_hand: bool) -> Style {
        let style = match cell {
            Cell::Empty => Style::default().fg(Color::DarkGray).bg(Color::Black),
            Cell::Orphan => Style::default().fg(Color::Black).bg(Color::Gray),
            Cell::Hotel(hotel) => Style::default().fg(Color::Black).bg(hotel_color(hotel)),
        };
        match in_hand {
            true => style.fg(Color::White).add_modifier(Modifier::BOLD),
            false => style,
        }
    }

    fn render_stocks(&self, view: &GameSnapshot, area: Rect, frame: &mut Frame) -> Rect {
        let block = Self::titled_block("Stocks");

        let mut lines = vec![Line::from("    chain        size price  left").bold()];
        for info in &view.chains {
            let text = format!(
                "{} {:<12} {:>4} {:>5} {:>5}{}",
                info.hotel.initial(),
                info.hotel.to_string(),
                info.size,
                info.price,
                info.stock_available,
                if info.safe { "  safe" } else { "" }
            );
            let style = match info.active {
                true => Style::default().fg(hotel_color(info.hotel)),
                false => Style::default().fg(Color::DarkGray),
            };
            lines.push(Line::from(Span::styled(text, style)));
        }

        lines.push(Line::from(""));
        for player in &view.players {
            let marker = match view.request.player() == Some(player.id) {
                true => ">",
                false => " ",
            };
            let link = match player.connected {
                true => "",
                false => " (away)",
            };
            lines.push(Line::from(format!(
                "{} {} {}: {} tiles{}",
                marker, player.id, player.name, player.hand_size, link
            )));
        }
        lines.push(Line::from(format!("Tiles left in the bag: {}", view.tiles_remaining)));

        if let Some(scores) = &view.final_scores {
            lines.push(Line::from(""));
            lines.push(Line::from("Final scores").bold());
            for score in scores {
                let line = Line::from(format!(
                    "{}. {} ${} (cash {}, bonuses {}, sold {})",
                    score.rank,
                    score.name,
                    score.total,
                    score.cash_on_hand,
                    score.bonuses,
                    score.liquidation
                ));
                lines.push(match score.winner {
                    true => line.bold(),
                    false => line,
                });
            }
        }

        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);

        inner
    }

    fn prompt(&self, view: &GameSnapshot) -> String {
        if !view.is_my_turn() {
            return match view.request.player() {
                Some(player) => format!("Waiting for {}", player),
                None => "Game over. q quits".to_string(),
            };
        }
        let initials = |hotels: &[Hotel]| {
            hotels
                .iter()
                .map(|hotel| hotel.initial().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };

        match &view.request {
            AcquireRequest::PlaceTile { .. } => "Place a tile: 1-6".to_string(),
            AcquireRequest::FoundChain { options, .. } => {
                format!("Found a chain: {}", initials(options))
            }
            AcquireRequest::ChooseMergerSurvivor { tied, .. } => {
                format!("Choose the surviving chain: {}", initials(tied))
            }
            AcquireRequest::DisposeStock {
                defunct_chain,
                surviving_chain,
                holding,
                price,
                trade_available,
                ..
            } => {
                let hold = holding.saturating_sub(self.draft.sell + self.draft.trade);
                let trade_key = match trade_available {
                    true => format!(", t trades 2 for 1 {}", surviving_chain),
                    false => String::new(),
                };
                format!(
                    "{} is defunct at ${}: sell {} trade {} hold {}. s sells{}, r resets, Enter confirms",
                    defunct_chain, price, self.draft.sell, self.draft.trade, hold, trade_key
                )
            }
            AcquireRequest::BuyStock {
                end_game_available, ..
            } => {
                let cart = self
                    .draft
                    .cart
                    .iter()
                    .map(|(hotel, quantity)| format!("{} {}", quantity, hotel))
                    .collect::<Vec<_>>()
                    .join(", ");
                let end = match end_game_available {
                    true => ", e ends the game",
                    false => "",
                };
                format!(
                    "Buy up to {} [{}]: chain initials add, Backspace clears, Enter confirms{}",
                    STOCK_TO_BUY_PER_TURN, cart, end
                )
            }
            AcquireRequest::GameOver => "Game over. q quits".to_string(),
        }
    }

    fn render_available_tiles(&self, view: &GameSnapshot, area: Rect, frame: &mut Frame) -> Rect {
        let block = Self::titled_block("Available Tiles");

        let hand: Vec<Span> = view
            .you
            .as_ref()
            .map(|you| {
                you.hand
                    .iter()
                    .enumerate()
                    .map(|(i, (tile, status))| {
                        let (mark, style) = match status {
                            TileStatus::Playable => ("", Style::default()),
                            TileStatus::Unfoundable => ("~", Style::default().fg(Color::Yellow)),
                            TileStatus::Dead | TileStatus::Occupied => {
                                ("x", Style::default().fg(Color::DarkGray))
                            }
                        };
                        Span::styled(format!(" {}:{}{} ", i + 1, tile, mark), style)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut lines = vec![Line::from(hand), Line::from(self.prompt(view))];
        if let Some(status) = &self.status {
            lines.push(Line::from(status.as_str()).italic());
        }

        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(Text::from(lines)).centered().block(block), area);

        inner
    }

    fn render_cash(&self, view: &GameSnapshot, area: Rect, frame: &mut Frame) -> Rect {
        let block = Self::titled_block("Cash");

        let mut lines = Vec::new();
        if let Some(you) = &view.you {
            lines.push(Line::from(format!("${}", you.cash)).bold());
            let holdings = you
                .holdings
                .iter()
                .map(|(hotel, shares)| {
                    Span::styled(
                        format!("{}:{} ", hotel.initial(), shares),
                        Style::default().fg(hotel_color(*hotel)),
                    )
                })
                .collect::<Vec<_>>();
            lines.push(Line::from(holdings));
        }

        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(Text::from(lines)).centered().block(block), area);

        inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{
        acquire_game::{tests::options, AcquireGame},
        acquire_game_state::Phase,
        acquire_response::AcquirePlayerResponse,
        game_options::{GameOptions, SeatConfig},
    };

    fn game() -> AcquireGame {
        AcquireGame::new(&options(2)).unwrap()
    }

    fn view(game: &AcquireGame, seat: usize) -> GameSnapshot {
        GameSnapshot::new(game, 0, Some(PlayerId(seat)))
    }

    #[test]
    fn test_digit_places_hand_tile() {
        let game = game();
        let view = view(&game, 0);
        let mut draft = Draft::default();
        let third = view.you.as_ref().unwrap().hand[2].0;

        assert_eq!(
            handle_key(&view, &mut draft, KeyCode::Char('3')),
            KeyOutcome::Submit(AcquireResponse::PlaceTile { tile: third })
        );
        assert_eq!(handle_key(&view, &mut draft, KeyCode::Char('9')), KeyOutcome::Nothing);
        assert_eq!(handle_key(&view, &mut draft, KeyCode::Char('q')), KeyOutcome::Quit);
    }

    #[test]
    fn test_keys_ignored_when_not_your_turn() {
        let game = game();
        let view = view(&game, 1);
        let mut draft = Draft::default();
        assert_eq!(handle_key(&view, &mut draft, KeyCode::Char('1')), KeyOutcome::Nothing);
    }

    #[test]
    fn test_buy_cart_and_end_turn() {
        let options = GameOptions::builder()
            .seats(vec![SeatConfig::human("Ada"), SeatConfig::human("Bo")])
            .seed(3)
            .draw_starting_tiles(false)
            .build();
        let mut game = AcquireGame::new(&options).unwrap();
        let tile = game.legal_actions(PlayerId(0))[0].clone();
        game.apply(AcquirePlayerResponse::new(tile, PlayerId(0))).unwrap();
        assert_eq!(game.phase(), Phase::BuyStocks);

        let view = view(&game, 0);
        let mut draft = Draft::default();
        // no active chain yet, so chain keys add nothing
        assert_eq!(handle_key(&view, &mut draft, KeyCode::Char('t')), KeyOutcome::Nothing);
        assert_eq!(draft.cart.len(), 0);
        assert_eq!(
            handle_key(&view, &mut draft, KeyCode::Enter),
            KeyOutcome::Submit(AcquireResponse::EndTurn)
        );
        assert_eq!(handle_key(&view, &mut draft, KeyCode::Char('e')), KeyOutcome::Nothing);
    }

    #[test]
    fn test_disposition_draft() {
        let mut snapshot = view(&game(), 0);
        snapshot.request = AcquireRequest::DisposeStock {
            player: PlayerId(0),
            defunct_chain: Hotel::Luxor,
            surviving_chain: Hotel::Tower,
            holding: 5,
            price: 300,
            trade_available: true,
        };
        let mut draft = Draft::default();

        handle_key(&snapshot, &mut draft, KeyCode::Char('s'));
        handle_key(&snapshot, &mut draft, KeyCode::Char('t'));
        handle_key(&snapshot, &mut draft, KeyCode::Char('t'));
        // nothing is left undecided, so a third trade does not fit
        handle_key(&snapshot, &mut draft, KeyCode::Char('t'));

        assert_eq!(
            handle_key(&snapshot, &mut draft, KeyCode::Enter),
            KeyOutcome::Submit(AcquireResponse::MergerDisposition {
                defunct_chain: Hotel::Luxor,
                sell: 1,
                trade: 4,
                hold: 0,
            })
        );
        assert_eq!(draft, Draft::default());
    }
}
