use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    combat::{combat_stats, progression},
    ecs::components::Progression,
    game::{Game, RunState},
    gamelog::GameLog,
    world::WorldState,
};

pub const SCREEN_WIDTH: i32 = 80;
pub const SCREEN_HEIGHT: i32 = 50;
const PANEL_HEIGHT: i32 = 7;
const PANEL_Y: i32 = SCREEN_HEIGHT - PANEL_HEIGHT;
const BAR_X: i32 = 1;
const BAR_WIDTH: i32 = 20;
const LOG_X: i32 = BAR_WIDTH + 2;
const LOG_LINES: usize = 6;
const MENU_WIDTH: i32 = 60;

const DARK_WALL: (u8, u8, u8) = (0, 0, 100);
const LIGHT_WALL: (u8, u8, u8) = (130, 110, 50);
const DARK_GROUND: (u8, u8, u8) = (50, 50, 150);
const LIGHT_GROUND: (u8, u8, u8) = (200, 180, 50);
const DANGER_GROUND: (u8, u8, u8) = (150, 40, 40);

pub fn draw_game(ctx: &mut BTerm, game: &Game) {
    let world = &game.world;
    draw_map(ctx, world);
    draw_entities(ctx, world);
    draw_panel(ctx, world);
    draw_names_under_mouse(ctx, world);

    match game.state() {
        RunState::Menu(kind) => draw_menu(ctx, kind.title(), &game.menu_options(kind)),
        RunState::LevelUp => draw_menu(
            ctx,
            "You feel stronger. Choose a reward:",
            &game.level_up_options(),
        ),
        RunState::Dead => ctx.print_color_centered(
            PANEL_Y / 2,
            RGB::named(RED),
            RGB::named(BLACK),
            "You have died. Press Escape to quit.",
        ),
        RunState::Playing => {}
    }
}

fn draw_map(ctx: &mut BTerm, world: &WorldState) {
    let visible = world.ecs.visible_points();
    let danger = world.ecs.danger_zones();
    let max_draw_y = PANEL_Y.min(world.grid.height);

    for y in 0..max_draw_y {
        for x in 0..world.grid.width.min(SCREEN_WIDTH) {
            if let Some(bg) = tile_background(world, Point::new(x, y), &visible, &danger) {
                ctx.set(x, y, RGB::named(BLACK), bg, to_cp437(' '));
            }
        }
    }
}

/// Lit, remembered or unknown. Visible floor inside a guarded zone is tinted.
fn tile_background(
    world: &WorldState,
    point: Point,
    visible: &HashSet<Point>,
    danger: &HashSet<Point>,
) -> Option<RGB> {
    let tile = world.grid.tile_at(point)?;
    let (r, g, b) = if visible.contains(&point) {
        if tile.blocked {
            LIGHT_WALL
        } else if danger.contains(&point) {
            DANGER_GROUND
        } else {
            LIGHT_GROUND
        }
    } else if tile.explored {
        if tile.blocked { DARK_WALL } else { DARK_GROUND }
    } else {
        return None;
    };
    Some(RGB::from_u8(r, g, b))
}

/// Visible entities, plus always-visible ones on explored tiles, in draw
/// order so later entries end up on top.
fn draw_entities(ctx: &mut BTerm, world: &WorldState) {
    let visible = world.ecs.visible_points();
    let danger = world.ecs.danger_zones();
    for drawable in world.ecs.drawables() {
        let point = drawable.point;
        let shown = visible.contains(&point)
            || (drawable.always_visible && world.grid.is_explored(point));
        if !shown || point.y >= PANEL_Y {
            continue;
        }
        let bg = tile_background(world, point, &visible, &danger).unwrap_or(RGB::named(BLACK));
        ctx.set(point.x, point.y, drawable.renderable.fg, bg, drawable.renderable.glyph);
    }
}

fn draw_panel(ctx: &mut BTerm, world: &WorldState) {
    let player = world.player();
    if let Some(stats) = combat_stats(world, player) {
        draw_bar(
            ctx,
            PANEL_Y + 1,
            "HP",
            stats.hp,
            stats.max_hp,
            RGB::from_u8(191, 63, 63),
            RGB::from_u8(63, 0, 0),
        );
        draw_bar(
            ctx,
            PANEL_Y + 2,
            "MP",
            stats.mp,
            stats.max_mp,
            RGB::from_u8(63, 63, 191),
            RGB::from_u8(0, 0, 63),
        );
        let level = world
            .ecs
            .get::<Progression>(player)
            .map_or(1, |progress| progress.level);
        let needed = progression::threshold(&world.config, level);
        ctx.print_color(
            BAR_X,
            PANEL_Y + 4,
            RGB::named(LIGHT_GRAY),
            RGB::named(BLACK),
            format!("Dungeon level {}", world.dungeon_level),
        );
        ctx.print_color(
            BAR_X,
            PANEL_Y + 5,
            RGB::named(LIGHT_GRAY),
            RGB::named(BLACK),
            format!("Level {level}  XP {}/{needed}", stats.xp),
        );
        ctx.print_color(
            BAR_X,
            PANEL_Y + 6,
            RGB::named(GRAY),
            RGB::named(BLACK),
            format!("ATK {} DEF {} MAG {}", stats.power, stats.defense, stats.magic),
        );
    }
    draw_log(ctx, &world.log, PANEL_Y + 1);
}

fn draw_bar(ctx: &mut BTerm, y: i32, name: &str, value: i32, max: i32, fg: RGB, bg: RGB) {
    ctx.draw_bar_horizontal(
        BAR_X,
        y,
        BAR_WIDTH,
        value.max(0),
        max.max(1),
        fg,
        bg,
    );
    ctx.print_color(
        BAR_X + 1,
        y,
        RGB::named(WHITE),
        fg,
        format!("{name}: {value}/{max}"),
    );
}

pub fn draw_log(ctx: &mut BTerm, log: &GameLog, start_y: i32) {
    for (row, entry) in log.recent(LOG_LINES).iter().enumerate() {
        ctx.print_color(
            LOG_X,
            start_y + row as i32,
            entry.color,
            RGB::named(BLACK),
            &entry.text,
        );
    }
}

fn draw_names_under_mouse(ctx: &mut BTerm, world: &WorldState) {
    let (x, y) = ctx.mouse_pos();
    let names = world.ecs.names_at(Point::new(x, y));
    if names.is_empty() {
        return;
    }
    ctx.print_color(
        BAR_X,
        PANEL_Y,
        RGB::named(LIGHT_GRAY),
        RGB::named(BLACK),
        names.join(", "),
    );
}

fn draw_menu(ctx: &mut BTerm, header: &str, options: &[String]) {
    let height = options.len() as i32 + 3;
    let left = (SCREEN_WIDTH - MENU_WIDTH) / 2;
    let top = ((PANEL_Y - height) / 2).max(0);
    ctx.draw_box(
        left,
        top,
        MENU_WIDTH,
        height,
        RGB::named(WHITE),
        RGB::named(BLACK),
    );
    ctx.print_color(
        left + 2,
        top + 1,
        RGB::named(YELLOW),
        RGB::named(BLACK),
        header,
    );
    for (idx, option) in options.iter().enumerate() {
        let letter = (b'a' + idx as u8) as char;
        ctx.print_color(
            left + 2,
            top + 2 + idx as i32,
            RGB::named(WHITE),
            RGB::named(BLACK),
            format!("({letter}) {option}"),
        );
    }
}
