//! The authoritative game: every action goes through [`AcquireGame::apply`],
//! which validates it completely before touching anything.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    acquire_constants::{HAND_SIZE, STOCK_PER_HOTEL, TILE_COUNT},
    acquire_error::{AcquireError, RuleViolation, ValidationError},
    acquire_game_state::{AcquireGameState, Phase},
    acquire_request::AcquireRequest,
    acquire_response::{AcquirePlayerResponse, AcquireResponse},
    game_board::{GameBoard, PlacementKind, TileStatus},
    game_options::{ConfigError, GameOptions},
    game_states::{
        buy_stock_state::BuyStockState,
        dispose_stock_state::DisposeStockState,
        game_start_state::GameStartState,
        merge_state::{MergerChoiceState, MergerState},
    },
    hotel_chains::ChainRegistry,
    hotel_data::{is_game_ending_size, Hotel},
    merger::{
        defunct_order, legal_dispositions, select_survivor, shareholder_bonuses, turn_order_from,
        validate_disposition, Disposition, SurvivorSelection,
    },
    player::{Player, PlayerId},
    stock_market::{self, StockPurchase},
    tile::Tile,
    tile_bag::TileBag,
};

/// One line of the final standings.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct FinalScore {
    pub player: PlayerId,
    pub name: String,
    pub cash_on_hand: u32,
    pub bonuses: u32,
    pub liquidation: u32,
    pub total: u32,
    /// 1 for the winners; tied totals share a rank.
    pub rank: usize,
    pub winner: bool,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AcquireGame {
    players: Vec<Player>,
    board: GameBoard,
    chains: ChainRegistry,
    bag: TileBag,
    dead_tiles: Vec<Tile>,
    current_player: PlayerId,
    turn: u32,
    state: AcquireGameState,
    final_scores: Option<Vec<FinalScore>>,
}

impl AcquireGame {
    pub fn new(options: &GameOptions) -> Result<Self, ConfigError> {
        let bag = TileBag::shuffled(&mut options.rng());
        Self::with_bag(options, bag)
    }

    /// Starts a game that deals from `bag` instead of a fresh shuffle.
    pub fn with_bag(options: &GameOptions, mut bag: TileBag) -> Result<Self, ConfigError> {
        options.validate()?;

        let mut players: Vec<Player> = options
            .seats
            .iter()
            .enumerate()
            .map(|(i, seat)| Player::new(PlayerId(i), &seat.name, seat.kind, options.starting_cash))
            .collect();

        let mut board = GameBoard::new();
        let mut first_player = PlayerId(0);

        if options.draw_starting_tiles {
            let mut start = GameStartState::new();
            for player in &players {
                let Some(tile) = bag.draw() else { break };
                board.place_orphan(tile);
                debug!(player = %player.id, %tile, "starting tile drawn");
                start.player_drew_tile(player.id, tile);
            }
            if let Some((tile, player)) = start.winner() {
                debug!(%player, %tile, "starting tile closest to 1-A");
                first_player = player;
            }
        }

        for player in &mut players {
            while player.tiles.len() < HAND_SIZE {
                match bag.draw() {
                    Some(tile) => player.tiles.push(tile),
                    None => break,
                }
            }
        }

        let mut game = Self {
            players,
            board,
            chains: ChainRegistry::new(),
            bag,
            dead_tiles: Vec::new(),
            current_player: first_player,
            turn: 1,
            state: AcquireGameState::PlaceTile,
            final_scores: None,
        };
        info!(players = game.players.len(), first = %first_player, "game started");
        game.begin_turn();
        Ok(game)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0)
    }

    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    pub fn bag_remaining(&self) -> usize {
        self.bag.remaining()
    }

    pub fn dead_tiles(&self) -> &[Tile] {
        &self.dead_tiles
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn state(&self) -> &AcquireGameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_over(&self) -> bool {
        self.state == AcquireGameState::GameOver
    }

    pub fn final_scores(&self) -> Option<&[FinalScore]> {
        self.final_scores.as_deref()
    }

    /// The player whose input the game is waiting for.
    pub fn awaiting_player(&self) -> Option<PlayerId> {
        match &self.state {
            AcquireGameState::PlaceTile
            | AcquireGameState::FoundChain(_)
            | AcquireGameState::BuyStock(_) => Some(self.current_player),
            AcquireGameState::MergerChoice(choice) => Some(choice.merge_maker),
            AcquireGameState::DisposeStock(disposal) => disposal.current_disposer(),
            AcquireGameState::GameOver => None,
        }
    }

    pub fn end_game_available(&self) -> bool {
        matches!(&self.state, AcquireGameState::BuyStock(buy) if buy.end_game_available)
    }

    pub fn request(&self) -> AcquireRequest {
        let player = self.current_player;
        match &self.state {
            AcquireGameState::PlaceTile => AcquireRequest::PlaceTile { player },
            AcquireGameState::FoundChain(_) => AcquireRequest::FoundChain {
                player,
                options: self.board.get_inactive_hotels(),
            },
            AcquireGameState::MergerChoice(choice) => AcquireRequest::ChooseMergerSurvivor {
                player: choice.merge_maker,
                tied: choice.tied.clone(),
            },
            AcquireGameState::DisposeStock(disposal) => {
                let disposer = disposal.current_disposer().unwrap_or(player);
                let survivor = disposal.merger.surviving_hotel;
                AcquireRequest::DisposeStock {
                    player: disposer,
                    defunct_chain: disposal.defunct_chain,
                    surviving_chain: survivor,
                    holding: self.players[disposer.0].holding(disposal.defunct_chain),
                    price: disposal.defunct_price,
                    trade_available: self.chains.stock_available(survivor) > 0,
                }
            }
            AcquireGameState::BuyStock(buy) => AcquireRequest::BuyStock {
                player,
                end_game_available: buy.end_game_available,
            },
            AcquireGameState::GameOver => AcquireRequest::GameOver,
        }
    }

    /// The player's hand, each tile classified against the current board.
    pub fn hand_status(&self, id: PlayerId) -> Vec<(Tile, TileStatus)> {
        self.player(id)
            .map(|player| {
                player
                    .tiles
                    .iter()
                    .map(|tile| (*tile, self.board.classify(*tile)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_connected(&mut self, id: PlayerId, connected: bool) -> Result<(), AcquireError> {
        let player = self
            .players
            .get_mut(id.0)
            .ok_or(ValidationError::UnknownPlayer(id))?;
        player.connected = connected || player.is_bot();
        Ok(())
    }

    /// Applies one action. On error nothing has changed.
    pub fn apply(&mut self, action: AcquirePlayerResponse) -> Result<Phase, AcquireError> {
        let AcquirePlayerResponse { player, response } = action;
        self.validate_turn(player, &response)?;

        match response {
            AcquireResponse::PlaceTile { tile } => self.place_tile(player, tile)?,
            AcquireResponse::FoundChain { chain } => self.found_chain(player, chain)?,
            AcquireResponse::BuyStocks { purchases } => self.buy_stocks(player, &purchases)?,
            AcquireResponse::MergerChoice { surviving_chain } => {
                self.choose_survivor(surviving_chain)?
            }
            AcquireResponse::MergerDisposition {
                defunct_chain,
                sell,
                trade,
                hold,
            } => self.dispose_stock(player, defunct_chain, Disposition { sell, trade, hold })?,
            AcquireResponse::EndTurn => self.finish_turn(),
            AcquireResponse::EndGame => {
                info!(%player, "player ends the game");
                self.finish_game();
            }
        }

        Ok(self.phase())
    }

    fn validate_turn(&self, player: PlayerId, response: &AcquireResponse) -> Result<(), ValidationError> {
        if player.0 >= self.players.len() {
            return Err(ValidationError::UnknownPlayer(player));
        }

        let turn_control = matches!(response, AcquireResponse::EndTurn | AcquireResponse::EndGame);
        let wrong_phase = match turn_control {
            true => ValidationError::ActionNotAllowed,
            false => ValidationError::InvalidPhase,
        };

        if self.is_over() {
            return Err(wrong_phase);
        }
        if self.awaiting_player() != Some(player) {
            return Err(ValidationError::NotYourTurn(player));
        }

        let phase_matches = match (&self.state, response) {
            (AcquireGameState::PlaceTile, AcquireResponse::PlaceTile { .. })
            | (AcquireGameState::FoundChain(_), AcquireResponse::FoundChain { .. })
            | (AcquireGameState::MergerChoice(_), AcquireResponse::MergerChoice { .. })
            | (AcquireGameState::DisposeStock(_), AcquireResponse::MergerDisposition { .. })
            | (AcquireGameState::BuyStock(_), AcquireResponse::BuyStocks { .. })
            | (AcquireGameState::BuyStock(_), AcquireResponse::EndTurn) => true,
            (AcquireGameState::BuyStock(buy), AcquireResponse::EndGame) => buy.end_game_available,
            _ => false,
        };

        match phase_matches {
            true => Ok(()),
            false => Err(wrong_phase),
        }
    }

    fn place_tile(&mut self, id: PlayerId, tile: Tile) -> Result<(), AcquireError> {
        if !self.players[id.0].has_tile(tile) {
            return Err(RuleViolation::NotYourTile.into());
        }
        if !self.board.classify(tile).is_placeable() {
            return Err(RuleViolation::InvalidTile.into());
        }

        let kind = self.board.placement_kind(tile);
        self.players[id.0].take_tile(tile);
        self.board.place_orphan(tile);
        info!(player = %id, %tile, ?kind, "tile placed");

        match kind {
            PlacementKind::Orphan | PlacementKind::OrphanCluster => self.enter_buy_stocks(),
            PlacementKind::FoundChain => self.state = AcquireGameState::FoundChain(tile),
            PlacementKind::Grow(hotel) => {
                self.board.flood_hotel(tile, hotel);
                self.enter_buy_stocks();
            }
            PlacementKind::Merge(touched) => self.begin_merger(id, tile, touched),
        }
        Ok(())
    }

    fn found_chain(&mut self, id: PlayerId, hotel: Hotel) -> Result<(), AcquireError> {
        let AcquireGameState::FoundChain(tile) = self.state else {
            return Err(ValidationError::InvalidPhase.into());
        };
        if self.board.is_active(hotel) {
            return Err(RuleViolation::ChainAlreadyActive.into());
        }

        let size = self.board.flood_hotel(tile, hotel);
        let bonus_share = self.chains.grant_founder_share(hotel, &mut self.players[id.0]);
        info!(player = %id, %hotel, size, bonus_share, "chain founded");

        self.enter_buy_stocks();
        Ok(())
    }

    fn begin_merger(&mut self, merge_maker: PlayerId, tile: Tile, touched: Vec<Hotel>) {
        match select_survivor(&self.board, &touched) {
            SurvivorSelection::Tied(tied) => {
                info!(player = %merge_maker, ?tied, "merger needs a survivor chosen");
                self.state = AcquireGameState::MergerChoice(MergerChoiceState {
                    merge_maker,
                    tile,
                    touched,
                    tied,
                });
            }
            SurvivorSelection::Decided { survivor, defuncts } => {
                info!(%survivor, ?defuncts, "merger");
                self.resolve_merger(MergerState::new(merge_maker, tile, survivor, defuncts));
            }
        }
    }

    fn choose_survivor(&mut self, survivor: Hotel) -> Result<(), AcquireError> {
        let AcquireGameState::MergerChoice(choice) = &self.state else {
            return Err(ValidationError::InvalidPhase.into());
        };
        if !choice.tied.contains(&survivor) {
            return Err(RuleViolation::InvalidChain.into());
        }

        let defuncts = defunct_order(&self.board, &choice.touched, survivor);
        info!(%survivor, ?defuncts, "survivor chosen");
        let merger = MergerState::new(choice.merge_maker, choice.tile, survivor, defuncts);
        self.resolve_merger(merger);
        Ok(())
    }

    // Winds up defunct chains until one needs stockholder decisions or none remain.
    fn resolve_merger(&mut self, mut merger: MergerState) {
        let survivor = merger.surviving_hotel;

        while let Some(defunct) = merger.next_defunct_hotel() {
            let price = self.board.get_hotel_stock_price(defunct);
            self.pay_bonuses(defunct, merger.merge_maker);

            let disposers: Vec<PlayerId> = turn_order_from(merger.merge_maker, self.players.len())
                .into_iter()
                .filter(|id| self.players[id.0].holding(defunct) > 0)
                .collect();

            if disposers.is_empty() {
                self.retire_chain(defunct, survivor);
                continue;
            }

            self.state = AcquireGameState::DisposeStock(DisposeStockState::new(
                merger, defunct, price, disposers,
            ));
            return;
        }

        self.board.flood_hotel(merger.tile, survivor);
        info!(%survivor, size = self.board.get_hotel_chain_size(survivor), "merger complete");
        self.enter_buy_stocks();
    }

    fn retire_chain(&mut self, defunct: Hotel, survivor: Hotel) {
        let moved = self
            .board
            .replace_defunct_hotel_with_surviving_hotel(defunct, survivor);
        info!(%defunct, %survivor, moved, "chain absorbed");
    }

    fn dispose_stock(
        &mut self,
        id: PlayerId,
        defunct: Hotel,
        disposition: Disposition,
    ) -> Result<(), AcquireError> {
        let AcquireGameState::DisposeStock(disposal) = &self.state else {
            return Err(ValidationError::InvalidPhase.into());
        };
        if defunct != disposal.defunct_chain {
            return Err(RuleViolation::InvalidDisposition.into());
        }
        let survivor = disposal.merger.surviving_hotel;
        let price = disposal.defunct_price;
        let holding = self.players[id.0].holding(defunct);
        validate_disposition(holding, &disposition, self.chains.stock_available(survivor))?;

        let Disposition { sell, trade, .. } = disposition;
        self.chains.withdraw(survivor, trade / 2)?;
        self.chains.deposit(defunct, sell + trade);

        let player = &mut self.players[id.0];
        player.remove_stock(defunct, sell + trade);
        player.add_stock(survivor, trade / 2);
        player.cash += sell * price;
        debug!(player = %id, %defunct, ?disposition, proceeds = sell * price, "stock disposed");

        let finished = match &mut self.state {
            AcquireGameState::DisposeStock(disposal) => disposal.player_handled_stock(),
            _ => false,
        };
        if finished {
            let state = std::mem::replace(&mut self.state, AcquireGameState::PlaceTile);
            if let AcquireGameState::DisposeStock(disposal) = state {
                self.retire_chain(defunct, survivor);
                self.resolve_merger(disposal.merger);
            }
        }
        Ok(())
    }

    fn buy_stocks(&mut self, id: PlayerId, purchases: &StockPurchase) -> Result<(), AcquireError> {
        let cost = stock_market::buy_stocks(
            &self.board,
            &mut self.chains,
            &mut self.players[id.0],
            purchases,
        )?;
        if !purchases.is_empty() {
            info!(player = %id, ?purchases, cost, "stock bought");
        }
        self.finish_turn();
        Ok(())
    }

    /// Pays majority/minority bonuses for `hotel` at its current size.
    fn pay_bonuses(&mut self, hotel: Hotel, start: PlayerId) -> Vec<(PlayerId, u32)> {
        let holdings: Vec<(PlayerId, u32)> = turn_order_from(start, self.players.len())
            .into_iter()
            .map(|id| (id, self.players[id.0].holding(hotel)))
            .collect();

        let payouts = shareholder_bonuses(
            &holdings,
            self.board.get_hotel_majority_stock_bonus(hotel),
            self.board.get_hotel_minority_stock_bonus(hotel),
        );
        for (id, amount) in &payouts {
            self.players[id.0].cash += amount;
            debug!(player = %id, %hotel, amount, "bonus paid");
        }
        payouts
    }

    fn end_game_eligible(&self) -> bool {
        let active = self.board.get_active_hotels();
        !active.is_empty()
            && (active
                .iter()
                .any(|hotel| is_game_ending_size(self.board.get_hotel_chain_size(*hotel)))
                || active.iter().all(|hotel| self.board.is_safe(*hotel)))
    }

    fn enter_buy_stocks(&mut self) {
        let end_game_available = self.end_game_eligible();
        self.state =
            AcquireGameState::BuyStock(BuyStockState::new(end_game_available));
    }

    fn has_placeable_tile(&self, id: PlayerId) -> bool {
        self.players[id.0]
            .tiles
            .iter()
            .any(|tile| self.board.classify(*tile).is_placeable())
    }

    /// Discards dead tiles and draws back up to a full hand.
    fn refill_hand(&mut self, id: PlayerId) {
        loop {
            let board = &self.board;
            let player = &mut self.players[id.0];
            let (dead, live): (Vec<Tile>, Vec<Tile>) = player
                .tiles
                .iter()
                .partition(|tile| board.classify(**tile) == TileStatus::Dead);
            player.tiles = live;
            if !dead.is_empty() {
                debug!(player = %id, ?dead, "dead tiles discarded");
                self.dead_tiles.extend(dead);
            }

            if self.players[id.0].tiles.len() >= HAND_SIZE || self.bag.is_empty() {
                return;
            }
            while self.players[id.0].tiles.len() < HAND_SIZE {
                match self.bag.draw() {
                    Some(tile) => self.players[id.0].tiles.push(tile),
                    None => break,
                }
            }
        }
    }

    fn finish_turn(&mut self) {
        self.refill_hand(self.current_player);
        self.current_player = PlayerId((self.current_player.0 + 1) % self.players.len());
        self.turn += 1;
        self.begin_turn();
    }

    fn begin_turn(&mut self) {
        self.state = AcquireGameState::PlaceTile;
        let id = self.current_player;
        if self.has_placeable_tile(id) {
            return;
        }

        self.refill_hand(id);
        if self.has_placeable_tile(id) {
            return;
        }

        let anyone_can_place = self
            .players
            .iter()
            .any(|player| self.has_placeable_tile(player.id));
        if self.bag.is_empty() && !anyone_can_place {
            info!("no tile can be placed anymore");
            self.finish_game();
            return;
        }

        info!(player = %id, "no placeable tile, skipping to buying stock");
        self.enter_buy_stocks();
    }

    /// Pays final bonuses, sells every share to the bank and ranks the players.
    fn finish_game(&mut self) {
        let cash_on_hand: Vec<u32> = self.players.iter().map(|player| player.cash).collect();
        let mut bonuses = vec![0; self.players.len()];
        let mut liquidation = vec![0; self.players.len()];

        for hotel in self.board.get_active_hotels() {
            for (id, amount) in self.pay_bonuses(hotel, self.current_player) {
                bonuses[id.0] += amount;
            }

            let price = self.board.get_hotel_stock_price(hotel);
            for player in &mut self.players {
                let shares = player.holding(hotel);
                if shares == 0 {
                    continue;
                }
                player.remove_stock(hotel, shares);
                player.cash += shares * price;
                self.chains.deposit(hotel, shares);
                liquidation[player.id.0] += shares * price;
            }
        }

        let best = self.players.iter().map(|player| player.cash).max().unwrap_or(0);
        let mut scores: Vec<FinalScore> = self
            .players
            .iter()
            .map(|player| FinalScore {
                player: player.id,
                name: player.name.clone(),
                cash_on_hand: cash_on_hand[player.id.0],
                bonuses: bonuses[player.id.0],
                liquidation: liquidation[player.id.0],
                total: player.cash,
                rank: 1 + self.players.iter().filter(|other| other.cash > player.cash).count(),
                winner: player.cash == best,
            })
            .collect();
        scores.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.player.cmp(&b.player)));

        for score in &scores {
            info!(player = %score.player, total = score.total, rank = score.rank, "final score");
        }
        self.final_scores = Some(scores);
        self.state = AcquireGameState::GameOver;
    }

    /// Every action the engine would accept from `id` right now.
    pub fn legal_actions(&self, id: PlayerId) -> Vec<AcquireResponse> {
        if self.awaiting_player() != Some(id) {
            return Vec::new();
        }

        match &self.state {
            AcquireGameState::PlaceTile => self
                .hand_status(id)
                .into_iter()
                .filter(|(_, status)| status.is_placeable())
                .map(|(tile, _)| AcquireResponse::PlaceTile { tile })
                .collect(),
            AcquireGameState::FoundChain(_) => self
                .board
                .get_inactive_hotels()
                .into_iter()
                .map(|chain| AcquireResponse::FoundChain { chain })
                .collect(),
            AcquireGameState::MergerChoice(choice) => choice
                .tied
                .iter()
                .map(|hotel| AcquireResponse::MergerChoice { surviving_chain: *hotel })
                .collect(),
            AcquireGameState::DisposeStock(disposal) => legal_dispositions(
                self.players[id.0].holding(disposal.defunct_chain),
                self.chains.stock_available(disposal.merger.surviving_hotel),
            )
            .into_iter()
            .map(|disposition| AcquireResponse::disposition(disposal.defunct_chain, disposition))
            .collect(),
            AcquireGameState::BuyStock(buy) => {
                let mut actions = vec![AcquireResponse::EndTurn];
                actions.extend(
                    stock_market::affordable_purchases(&self.board, &self.chains, self.players[id.0].cash)
                        .into_iter()
                        .filter(|purchases| !purchases.is_empty())
                        .map(|purchases| AcquireResponse::BuyStocks { purchases }),
                );
                if buy.end_game_available {
                    actions.push(AcquireResponse::EndGame);
                }
                actions
            }
            AcquireGameState::GameOver => Vec::new(),
        }
    }

    /// Checks the conservation laws. A failure means the engine itself is broken.
    pub fn check_invariants(&self) -> Result<(), AcquireError> {
        let inconsistent = |message: String| Err(AcquireError::Inconsistent(message));

        for hotel in Hotel::iter() {
            let held: u32 = self.players.iter().map(|player| player.holding(hotel)).sum();
            let available = self.chains.stock_available(hotel);
            if available + held != STOCK_PER_HOTEL {
                return inconsistent(format!(
                    "{} has {} shares in the bank and {} held",
                    hotel, available, held
                ));
            }
        }

        let in_hands: usize = self.players.iter().map(|player| player.tiles.len()).sum();
        let accounted = in_hands + self.bag.remaining() + self.board.tile_count() + self.dead_tiles.len();
        if accounted != TILE_COUNT {
            return inconsistent(format!("{} of {} tiles accounted for", accounted, TILE_COUNT));
        }

        if !self.board.chain_sizes_are_consistent() {
            return inconsistent("chain sizes disagree with the board".to_string());
        }

        for player in &self.players {
            if player.tiles.len() > HAND_SIZE {
                return inconsistent(format!("{} holds {} tiles", player.id, player.tiles.len()));
            }
            if let Some(tile) = player
                .tiles
                .iter()
                .find(|tile| self.board.classify(**tile) == TileStatus::Occupied)
            {
                return inconsistent(format!("{} holds {} which is already on the board", player.id, tile));
            }
        }

        if !self.is_over() && self.awaiting_player().is_none() {
            return inconsistent("nobody is expected to act".to_string());
        }
        Ok(())
    }
}
