// SPDX-License-Identifier: MIT
//
// vimux-term: the terminal side of the vimux emulator.
//
// Two halves: `input` turns the bytes or named tokens a multiplexer would
// deliver into key events, and `cell`/`grid` hold the character surface
// the renderer draws a frame onto. Nothing here touches a real tty; the
// whole crate is pure data so that replaying a key sequence is
// deterministic.

pub mod cell;
pub mod grid;
pub mod input;
