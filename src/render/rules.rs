//! Configuration-parameterized rules summary, independent of per-turn state.

use crate::config::GameConfig;

pub fn render_rules_reference(cfg: &GameConfig) -> String {
    format!(
        "RULES:\n\
         - {size}x{size} hex grid. Two players, {forces} forces each.\n\
         - Each player assigns hidden power values 1-5 to forces (each used once).\n\
         - Power 1 = Sovereign. Lose your Sovereign, lose the game.\n\
         - Victory: capture the enemy Sovereign, OR control {dom_hexes}+ Contentious hexes for \
         {dom_turns} consecutive turns (domination), OR eliminate all enemy forces.\n\
         \n\
         ORDERS (one per force per turn):\n\
         - Move (free): move to an adjacent hex.\n\
         - Charge ({charge_cost} Shih): move 1-2 hexes, +{charge_bonus} attack if entering combat. Requires supply.\n\
         - Scout ({scout_cost} Shih): stay put, reveal one enemy within {scout_range} hexes \
         ({scout_pct}% exact, otherwise a power band). Requires supply.\n\
         - Fortify ({fortify_cost} Shih): stay put, +{fortify_bonus} defense this turn. Requires supply.\n\
         - Ambush ({ambush_cost} Shih): stay put, +{ambush_bonus} defense when defending, hidden from the enemy. Requires supply.\n\
         \n\
         SUPPLY: a force has supply if it chains back to your Sovereign through friendly forces \
         within {supply_range} hexes per link (max {supply_hops} hops). Forces without supply can only Move.\n\
         \n\
         COMBAT: effective_power = base_power + order bonus + support (up to +{support_cap} from \
         adjacent friendlies) + terrain + random(-2..+2). Higher wins. Gap <= {retreat}: loser retreats. \
         Gap > {retreat}: loser eliminated. Tie: both retreat. Both powers revealed after combat.\n\
         \n\
         TERRAIN: Open (no effect), Difficult (+{terrain_bonus} defense), Contentious (objective, \
         +{contentious_bonus} Shih income), Scorched (impassable, forces die).\n\
         \n\
         VISIBILITY: you see enemies within {vis_range} hexes of your forces. Beyond that is fog of war.\n\
         \n\
         THE NOOSE: every {shrink} turns, the outermost ring becomes Scorched. Forces caught there die.\n\
         \n\
         RESOURCES: base income {income} Shih/turn + {contentious_bonus} per Contentious hex held. \
         Max {max_shih} Shih.\n\
         \n\
         SCOUT DISCLOSURE: exact Scout reveals are {disclosure} by default.",
        size = cfg.board_size,
        forces = cfg.force_count,
        dom_hexes = cfg.domination_hexes_required,
        dom_turns = cfg.domination_turns_required,
        charge_cost = cfg.charge_cost,
        charge_bonus = cfg.charge_attack_bonus,
        scout_cost = cfg.scout_cost,
        scout_range = cfg.scout_range,
        scout_pct = (cfg.scout_accuracy * 100.0).round() as i32,
        fortify_cost = cfg.fortify_cost,
        fortify_bonus = cfg.fortify_bonus,
        ambush_cost = cfg.ambush_cost,
        ambush_bonus = cfg.ambush_bonus,
        supply_range = cfg.supply_range,
        supply_hops = cfg.max_supply_hops,
        support_cap = cfg.max_support_bonus,
        retreat = cfg.retreat_threshold,
        terrain_bonus = cfg.difficult_defense_bonus,
        contentious_bonus = cfg.contentious_shih_bonus,
        vis_range = cfg.visibility_range,
        shrink = cfg.shrink_interval,
        income = cfg.base_shih_income,
        max_shih = cfg.max_shih,
        disclosure = if cfg.scout_exact_public { "public" } else { "private to the scouter" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_reference_reflects_nondefault_config() {
        let mut cfg = GameConfig::default();
        cfg.domination_turns_required = 9;
        let text = render_rules_reference(&cfg);
        assert!(text.contains('9'));
    }
}
