mod test_render_loop;
